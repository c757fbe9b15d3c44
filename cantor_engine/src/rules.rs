// Counterpoint rule detectors.
//
// Each detector is a pure function over beat snapshots (or, for range, over
// the voice lines directly) and returns its violations in emission order.
// Detectors never fail: a pair with a voice missing from a snapshot is
// skipped. The analyzer decides which detectors run and in what order.
//
// Transition rules (parallel, hidden, overlap) compare consecutive snapshots
// and attribute the violation to the arriving notes. Vertical rules
// (crossing, spacing) look at one snapshot. Interval classes are measured
// from the lower voice up, mod 12.

use crate::config::{Strictness, VoiceRanges};
use crate::line::VoiceLine;
use crate::pitch::{interval, pitch_name};
use crate::snapshot::BeatSnapshot;
use crate::violation::{RangeSubtype, Severity, Violation, ViolationKind, VoicePair};
use crate::voice::VoicePart;
use std::collections::BTreeMap;

/// The perfect consonances that parallel and hidden motion rules guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfectInterval {
    Fifth,
    Octave,
}

impl PerfectInterval {
    /// Interval classes counted as this consonance. The fifth class includes
    /// its inversion.
    pub fn contains(self, class: u8) -> bool {
        match self {
            PerfectInterval::Fifth => class == 5 || class == 7,
            PerfectInterval::Octave => class == 0,
        }
    }

    fn parallel_kind(self) -> ViolationKind {
        match self {
            PerfectInterval::Fifth => ViolationKind::ParallelFifths,
            PerfectInterval::Octave => ViolationKind::ParallelOctaves,
        }
    }

    fn hidden_kind(self) -> ViolationKind {
        match self {
            PerfectInterval::Fifth => ViolationKind::HiddenFifths,
            PerfectInterval::Octave => ViolationKind::HiddenOctaves,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PerfectInterval::Fifth => "fifth",
            PerfectInterval::Octave => "octave",
        }
    }
}

/// Neighbouring voices in each layout, upper first.
fn adjacent_pairs() -> Vec<VoicePair> {
    VoicePart::SATB
        .windows(2)
        .chain(VoicePart::EIGHT.windows(2))
        .map(|w| VoicePair::new(w[0], w[1]))
        .collect()
}

/// Every pair of voices sounding in both snapshots, upper first.
fn shared_pairs(a: &BeatSnapshot, b: &BeatSnapshot) -> Vec<VoicePair> {
    let parts: Vec<VoicePart> = a.voices.keys().filter(|p| b.voices.contains_key(p)).copied().collect();
    let mut pairs = Vec::new();
    for (i, upper) in parts.iter().enumerate() {
        for lower in &parts[i + 1..] {
            pairs.push(VoicePair::new(*upper, *lower));
        }
    }
    pairs
}

fn pair_id(kind: ViolationKind, beat: f64, pair: VoicePair) -> String {
    format!("{:?}@{}:{}-{}", kind, beat, pair.upper.slug(), pair.lower.slug())
}

fn arriving_ids(snapshot: &BeatSnapshot, pair: VoicePair) -> Vec<String> {
    [pair.upper, pair.lower]
        .iter()
        .filter_map(|p| snapshot.note_id(*p))
        .map(str::to_string)
        .collect()
}

/// Pitches of a pair in two consecutive snapshots:
/// (upper before, lower before, upper after, lower after).
fn transition(prev: &BeatSnapshot, curr: &BeatSnapshot, pair: VoicePair) -> Option<(u8, u8, u8, u8)> {
    Some((
        prev.pitch(pair.upper)?,
        prev.pitch(pair.lower)?,
        curr.pitch(pair.upper)?,
        curr.pitch(pair.lower)?,
    ))
}

/// Both voices held a perfect interval and move the same way into it again.
pub fn detect_parallels(snapshots: &[BeatSnapshot], perfect: PerfectInterval) -> Vec<Violation> {
    let kind = perfect.parallel_kind();
    let mut out = Vec::new();
    for w in snapshots.windows(2) {
        let (prev, curr) = (&w[0], &w[1]);
        for pair in shared_pairs(prev, curr) {
            let Some((u0, l0, u1, l1)) = transition(prev, curr, pair) else {
                continue;
            };
            if !interval::is_similar_motion(u0, u1, l0, l1) {
                continue;
            }
            let before = interval::class_above(l0, u0);
            let after = interval::class_above(l1, u1);
            if perfect.contains(before) && perfect.contains(after) {
                out.push(Violation {
                    id: pair_id(kind, curr.beat, pair),
                    kind,
                    severity: Severity::Error,
                    beat: curr.beat,
                    note_ids: arriving_ids(curr, pair),
                    voice_pair: Some(pair),
                    voice: None,
                    interval: Some(after),
                    range_subtype: None,
                    description: format!(
                        "Parallel {}s between {} and {} ({} to {}, {} to {})",
                        perfect.name(),
                        pair.upper,
                        pair.lower,
                        pitch_name(u0),
                        pitch_name(u1),
                        pitch_name(l0),
                        pitch_name(l1),
                    ),
                    suggestion: format!(
                        "Move {} or {} in contrary or oblique motion",
                        pair.upper, pair.lower
                    ),
                });
            }
        }
    }
    out
}

/// Similar motion into a perfect interval that was not held before.
///
/// Only the outer voices are judged by `strictness`; every inner pair is
/// reported as info.
pub fn detect_hidden(
    snapshots: &[BeatSnapshot],
    perfect: PerfectInterval,
    strictness: Strictness,
) -> Vec<Violation> {
    let kind = perfect.hidden_kind();
    let mut out = Vec::new();
    for w in snapshots.windows(2) {
        let (prev, curr) = (&w[0], &w[1]);
        for pair in shared_pairs(prev, curr) {
            let Some((u0, l0, u1, l1)) = transition(prev, curr, pair) else {
                continue;
            };
            if !interval::is_similar_motion(u0, u1, l0, l1) {
                continue;
            }
            let before = interval::class_above(l0, u0);
            let after = interval::class_above(l1, u1);
            if perfect.contains(before) || !perfect.contains(after) {
                continue;
            }
            let outer = pair.upper.is_top() && pair.lower.is_bottom();
            let severity = match (outer, strictness) {
                (false, _) => Severity::Info,
                (true, Strictness::Strict) => Severity::Error,
                (true, Strictness::Lenient) => Severity::Warning,
            };
            out.push(Violation {
                id: pair_id(kind, curr.beat, pair),
                kind,
                severity,
                beat: curr.beat,
                note_ids: arriving_ids(curr, pair),
                voice_pair: Some(pair),
                voice: None,
                interval: Some(after),
                range_subtype: None,
                description: format!(
                    "Hidden {} between {} and {}: similar motion into {} over {}",
                    perfect.name(),
                    pair.upper,
                    pair.lower,
                    pitch_name(u1),
                    pitch_name(l1),
                ),
                suggestion: format!("Approach the {} by step in the upper voice or by contrary motion", perfect.name()),
            });
        }
    }
    out
}

/// A nominally lower voice sounding above its upper neighbour.
pub fn detect_voice_crossing(snapshots: &[BeatSnapshot]) -> Vec<Violation> {
    let kind = ViolationKind::VoiceCrossing;
    let mut out = Vec::new();
    for snapshot in snapshots {
        for pair in adjacent_pairs() {
            let (Some(upper), Some(lower)) = (snapshot.pitch(pair.upper), snapshot.pitch(pair.lower)) else {
                continue;
            };
            if lower > upper {
                out.push(Violation {
                    id: pair_id(kind, snapshot.beat, pair),
                    kind,
                    severity: Severity::Warning,
                    beat: snapshot.beat,
                    note_ids: arriving_ids(snapshot, pair),
                    voice_pair: Some(pair),
                    voice: None,
                    interval: Some(interval::class_above(upper, lower)),
                    range_subtype: None,
                    description: format!(
                        "{} ({}) is above {} ({})",
                        pair.lower,
                        pitch_name(lower),
                        pair.upper,
                        pitch_name(upper),
                    ),
                    suggestion: format!("Keep {} below {}", pair.lower, pair.upper),
                });
            }
        }
    }
    out
}

/// A voice moving past where its neighbour just was.
pub fn detect_voice_overlap(snapshots: &[BeatSnapshot]) -> Vec<Violation> {
    let kind = ViolationKind::VoiceOverlap;
    let mut out = Vec::new();
    for w in snapshots.windows(2) {
        let (prev, curr) = (&w[0], &w[1]);
        for pair in adjacent_pairs() {
            let Some((u0, l0, u1, l1)) = transition(prev, curr, pair) else {
                continue;
            };
            let moved = prev.note_id(pair.upper) != curr.note_id(pair.upper)
                || prev.note_id(pair.lower) != curr.note_id(pair.lower);
            if !moved {
                continue;
            }
            let description = if l1 > u0 {
                format!(
                    "{} moves to {}, above the previous {} note {}",
                    pair.lower,
                    pitch_name(l1),
                    pair.upper,
                    pitch_name(u0),
                )
            } else if u1 < l0 {
                format!(
                    "{} moves to {}, below the previous {} note {}",
                    pair.upper,
                    pitch_name(u1),
                    pair.lower,
                    pitch_name(l0),
                )
            } else {
                continue;
            };
            out.push(Violation {
                id: pair_id(kind, curr.beat, pair),
                kind,
                severity: Severity::Info,
                beat: curr.beat,
                note_ids: arriving_ids(curr, pair),
                voice_pair: Some(pair),
                voice: None,
                interval: None,
                range_subtype: None,
                description,
                suggestion: "Keep each voice within its neighbour's previous pitch".to_string(),
            });
        }
    }
    out
}

/// Gaps wider than allowed between the upper voices.
pub fn detect_spacing(snapshots: &[BeatSnapshot], max_soprano_alto: u8, max_alto_tenor: u8) -> Vec<Violation> {
    let kind = ViolationKind::Spacing;
    let limits = [
        (VoicePair::new(VoicePart::Soprano, VoicePart::Alto), max_soprano_alto),
        (VoicePair::new(VoicePart::Alto, VoicePart::Tenor), max_alto_tenor),
        (VoicePair::new(VoicePart::SopranoII, VoicePart::AltoI), max_soprano_alto),
        (VoicePair::new(VoicePart::AltoII, VoicePart::TenorI), max_alto_tenor),
    ];
    let mut out = Vec::new();
    for snapshot in snapshots {
        for (pair, max) in limits {
            let (Some(upper), Some(lower)) = (snapshot.pitch(pair.upper), snapshot.pitch(pair.lower)) else {
                continue;
            };
            let gap = interval::semitones(lower, upper);
            if gap > max as i16 {
                out.push(Violation {
                    id: pair_id(kind, snapshot.beat, pair),
                    kind,
                    severity: Severity::Warning,
                    beat: snapshot.beat,
                    note_ids: arriving_ids(snapshot, pair),
                    voice_pair: Some(pair),
                    voice: None,
                    interval: u8::try_from(gap).ok(),
                    range_subtype: None,
                    description: format!(
                        "{} and {} are {} semitones apart (max {})",
                        pair.upper, pair.lower, gap, max
                    ),
                    suggestion: format!("Bring {} closer to {}", pair.lower, pair.upper),
                });
            }
        }
    }
    out
}

/// Notes outside their voice's absolute range, and optionally outside the
/// comfortable range.
pub fn detect_range(
    lines: &BTreeMap<VoicePart, VoiceLine>,
    ranges: &VoiceRanges,
    warn_on_extended_range: bool,
) -> Vec<Violation> {
    let kind = ViolationKind::Range;
    let mut out = Vec::new();
    for (part, line) in lines {
        let range = ranges.range(*part);
        for note in &line.notes {
            let Some(pitch) = note.pitch else {
                continue;
            };
            let (subtype, severity) = if pitch < range.low {
                (RangeSubtype::BelowAbsolute, Severity::Error)
            } else if pitch > range.high {
                (RangeSubtype::AboveAbsolute, Severity::Error)
            } else if !warn_on_extended_range {
                continue;
            } else if pitch < range.comfortable_low {
                (RangeSubtype::BelowComfortable, Severity::Warning)
            } else if pitch > range.comfortable_high {
                (RangeSubtype::AboveComfortable, Severity::Warning)
            } else {
                continue;
            };

            let (limit, word) = match subtype {
                RangeSubtype::BelowAbsolute => (range.low, "below the range floor"),
                RangeSubtype::AboveAbsolute => (range.high, "above the range ceiling"),
                RangeSubtype::BelowComfortable => (range.comfortable_low, "below the comfortable range"),
                RangeSubtype::AboveComfortable => (range.comfortable_high, "above the comfortable range"),
            };
            out.push(Violation {
                id: format!("{:?}:{}", kind, note.id),
                kind,
                severity,
                beat: note.start_beat,
                note_ids: vec![note.id.clone()],
                voice_pair: None,
                voice: Some(*part),
                interval: None,
                range_subtype: Some(subtype),
                description: format!("{} {} is {} ({})", part, pitch_name(pitch), word, pitch_name(limit)),
                suggestion: format!(
                    "Keep {} between {} and {}",
                    part,
                    pitch_name(range.comfortable_low),
                    pitch_name(range.comfortable_high)
                ),
            });
        }
    }
    out
}
