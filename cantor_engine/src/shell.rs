// Shell voicing selection: which chord tone each voice sings.
//
// A chord usually has more tones than a four-voice choir can sing, or fewer
// than an eight-voice one needs. Selection is a fixed table lookup keyed by
// chord type, voice count and style; there is no search. Each table entry
// names one role, or a short fallback chain ("fifth, else root").
//
// Slots are listed from the bottom voice upward (see
// `VoiceCount::parts_bottom_up`). 4-voice tables:
//
//   triad        root, third, fifth, root
//   7th          root, third, fifth|root, seventh
//   9th          root, third, seventh, ninth          (5th dropped)
//   11th classic root, third, seventh, eleventh
//   11th jazz    root, seventh, ninth|eleventh, eleventh (3rd dropped: it
//                clashes a minor ninth against the unresolved 11th)
//   13th         root, third, seventh, thirteenth     (5th, 9th, 11th dropped)
//
// The 8-voice tables double from the same selection, root in both basses.
//
// A "third" entry falls back to the suspended tone when the third was
// replaced by sus4/sus2. An entry that still resolves to nothing is filled
// from the chord's remaining tones: first tones the table has not used and
// does not deliberately drop (highest priority first), then cycling through
// every available tone in role order. No slot is ever left empty.

use crate::chord::{ChordRole, ChordTones, ChordType};
use crate::pitch::PitchClass;
use crate::voice::VoiceCount;
use serde::{Deserialize, Serialize};

/// Voicing style. Only 11th chords currently voice differently by style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingStyle {
    #[default]
    Classical,
    Jazz,
    Modern,
}

/// One table entry: the first role in the chain that the chord has wins.
type Pick = &'static [ChordRole];

const ROOT: Pick = &[ChordRole::Root];
const THIRD: Pick = &[ChordRole::Third, ChordRole::Eleventh, ChordRole::Ninth];
const FIFTH: Pick = &[ChordRole::Fifth];
const FIFTH_OR_ROOT: Pick = &[ChordRole::Fifth, ChordRole::Root];
const SEVENTH: Pick = &[ChordRole::Seventh];
const NINTH: Pick = &[ChordRole::Ninth];
const NINTH_OR_ELEVENTH: Pick = &[ChordRole::Ninth, ChordRole::Eleventh];
const ELEVENTH: Pick = &[ChordRole::Eleventh];
const THIRTEENTH: Pick = &[ChordRole::Thirteenth];

struct ShellTable {
    slots: &'static [Pick],
    /// Roles the table leaves out on purpose; never used to fill a gap.
    dropped: &'static [ChordRole],
}

fn four_voice_table(chord_type: ChordType, style: VoicingStyle) -> ShellTable {
    match (chord_type, style) {
        (ChordType::Triad, _) => ShellTable {
            slots: &[ROOT, THIRD, FIFTH, ROOT],
            dropped: &[],
        },
        (ChordType::Seventh, _) => ShellTable {
            slots: &[ROOT, THIRD, FIFTH_OR_ROOT, SEVENTH],
            dropped: &[],
        },
        (ChordType::Ninth, _) => ShellTable {
            slots: &[ROOT, THIRD, SEVENTH, NINTH],
            dropped: &[ChordRole::Fifth],
        },
        (ChordType::Eleventh, VoicingStyle::Classical) => ShellTable {
            slots: &[ROOT, THIRD, SEVENTH, ELEVENTH],
            dropped: &[ChordRole::Fifth, ChordRole::Ninth],
        },
        (ChordType::Eleventh, VoicingStyle::Jazz | VoicingStyle::Modern) => ShellTable {
            slots: &[ROOT, SEVENTH, NINTH_OR_ELEVENTH, ELEVENTH],
            dropped: &[ChordRole::Third, ChordRole::Fifth],
        },
        (ChordType::Thirteenth, _) => ShellTable {
            slots: &[ROOT, THIRD, SEVENTH, THIRTEENTH],
            dropped: &[ChordRole::Fifth, ChordRole::Ninth, ChordRole::Eleventh],
        },
    }
}

fn eight_voice_table(chord_type: ChordType, style: VoicingStyle) -> ShellTable {
    match (chord_type, style) {
        (ChordType::Triad, _) => ShellTable {
            slots: &[ROOT, ROOT, FIFTH, THIRD, ROOT, FIFTH, THIRD, ROOT],
            dropped: &[],
        },
        (ChordType::Seventh, _) => ShellTable {
            slots: &[ROOT, ROOT, FIFTH_OR_ROOT, THIRD, SEVENTH, ROOT, THIRD, FIFTH_OR_ROOT],
            dropped: &[],
        },
        (ChordType::Ninth, _) => ShellTable {
            slots: &[ROOT, ROOT, THIRD, SEVENTH, ROOT, NINTH, THIRD, NINTH],
            dropped: &[ChordRole::Fifth],
        },
        (ChordType::Eleventh, VoicingStyle::Classical) => ShellTable {
            slots: &[ROOT, ROOT, THIRD, SEVENTH, ROOT, ELEVENTH, THIRD, ELEVENTH],
            dropped: &[ChordRole::Fifth, ChordRole::Ninth],
        },
        (ChordType::Eleventh, VoicingStyle::Jazz | VoicingStyle::Modern) => ShellTable {
            slots: &[
                ROOT,
                FIFTH_OR_ROOT,
                SEVENTH,
                NINTH_OR_ELEVENTH,
                ROOT,
                ELEVENTH,
                NINTH_OR_ELEVENTH,
                ELEVENTH,
            ],
            dropped: &[ChordRole::Third],
        },
        (ChordType::Thirteenth, _) => ShellTable {
            slots: &[ROOT, ROOT, THIRD, SEVENTH, ROOT, THIRTEENTH, THIRD, THIRTEENTH],
            dropped: &[ChordRole::Fifth, ChordRole::Ninth, ChordRole::Eleventh],
        },
    }
}

/// Pick one pitch class per voice slot, bottom voice first.
///
/// Returns exactly `voice_count.count()` pitch classes. Returns an empty list
/// only for a chord with no tones at all, which classification never produces.
pub fn select_shell_voicing(
    tones: &ChordTones,
    chord_type: ChordType,
    voice_count: VoiceCount,
    style: VoicingStyle,
) -> Vec<PitchClass> {
    if tones.is_empty() {
        return Vec::new();
    }

    let table = match voice_count {
        VoiceCount::Four => four_voice_table(chord_type, style),
        VoiceCount::Eight => eight_voice_table(chord_type, style),
    };

    let mut picked: Vec<Option<ChordRole>> = table
        .slots
        .iter()
        .map(|chain| chain.iter().copied().find(|role| tones.get(*role).is_some()))
        .collect();

    // Root must be present in the bass; substitute the first tone otherwise.
    let first_role = tones.iter().next().map(|t| t.role);
    if tones.get(ChordRole::Root).is_none() {
        for slot in picked.iter_mut() {
            if *slot == Some(ChordRole::Root) || slot.is_none() {
                *slot = first_role;
            }
        }
    }

    fill_gaps(&mut picked, tones, table.dropped);

    picked
        .into_iter()
        .filter_map(|role| role.and_then(|r| tones.pitch_class(r)))
        .collect()
}

/// Fill slots the table could not resolve from the chord's other tones.
fn fill_gaps(picked: &mut [Option<ChordRole>], tones: &ChordTones, dropped: &[ChordRole]) {
    let mut unused: Vec<_> = tones
        .iter()
        .filter(|t| !picked.contains(&Some(t.role)) && !dropped.contains(&t.role))
        .collect();
    unused.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    let mut unused = unused.into_iter().map(|t| t.role);

    let all: Vec<ChordRole> = tones.iter().map(|t| t.role).collect();
    let mut cycle = all.iter().copied().cycle();

    for slot in picked.iter_mut().filter(|s| s.is_none()) {
        *slot = unused.next().or_else(|| cycle.next());
    }
}
