// Chord specifications and chord-tone classification.
//
// A chord arrives from the editor as a root (explicit pitch class, or a
// scale degree in a key), a closed quality, and a set of extension flags.
// Classification turns that into tagged chord tones: each distinct pitch
// class gets a role (root, third, fifth, ...) and a priority from a fixed
// interval table, so later stages can pick the most important tones when
// there are more tones than voices.
//
// Role assignment is by interval above the root, not by where the tone came
// from. A diminished seventh (9 semitones) therefore classifies as a
// thirteenth and an augmented fifth (8) as a thirteenth, which is what the
// shell voicing tables in shell.rs expect.
//
// See also: shell.rs (consumes `ChordTones` and `ChordType`), mode.rs
// (scale-degree roots).

use crate::error::VoicingError;
use crate::mode::Key;
use crate::pitch::PitchClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The nine chord qualities the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dom7,
    Maj7,
    Min7,
    #[serde(rename = "halfdim7")]
    HalfDim7,
    Dim7,
}

impl Quality {
    /// Semitones above the root for (third, fifth, seventh).
    fn intervals(self) -> (u8, u8, Option<u8>) {
        match self {
            Quality::Major => (4, 7, None),
            Quality::Minor => (3, 7, None),
            Quality::Diminished => (3, 6, None),
            Quality::Augmented => (4, 8, None),
            Quality::Dom7 => (4, 7, Some(10)),
            Quality::Maj7 => (4, 7, Some(11)),
            Quality::Min7 => (3, 7, Some(10)),
            Quality::HalfDim7 => (3, 6, Some(10)),
            Quality::Dim7 => (3, 6, Some(9)),
        }
    }

    pub fn has_seventh(self) -> bool {
        self.intervals().2.is_some()
    }
}

/// Extension and alteration flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Extensions {
    pub add9: bool,
    pub add11: bool,
    pub add13: bool,
    pub sus2: bool,
    pub sus4: bool,
    pub flat9: bool,
    pub sharp9: bool,
    pub sharp11: bool,
    pub flat13: bool,
}

impl Extensions {
    pub fn any(&self) -> bool {
        self.add9
            || self.add11
            || self.add13
            || self.sus2
            || self.sus4
            || self.flat9
            || self.sharp9
            || self.sharp11
            || self.flat13
    }

    /// Semitones above the root of the ninth, if any ninth flag is set.
    /// Altered ninths replace the natural one.
    fn ninth(&self) -> Option<i32> {
        if self.flat9 {
            Some(13)
        } else if self.sharp9 {
            Some(15)
        } else if self.add9 {
            Some(14)
        } else {
            None
        }
    }

    fn eleventh(&self) -> Option<i32> {
        if self.sharp11 {
            Some(18)
        } else if self.add11 {
            Some(17)
        } else {
            None
        }
    }

    fn thirteenth(&self) -> Option<i32> {
        if self.flat13 {
            Some(20)
        } else if self.add13 {
            Some(21)
        } else {
            None
        }
    }
}

/// Where a chord's root comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordRoot {
    /// An explicit root pitch class.
    PitchClass(PitchClass),
    /// A 1-based scale degree in a key, optionally altered by semitones.
    Degree {
        key: Key,
        degree: u8,
        #[serde(default)]
        alteration: i8,
    },
}

/// A chord as the editor describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordSpec {
    pub root: ChordRoot,
    pub quality: Quality,
    #[serde(default)]
    pub extensions: Extensions,
}

impl ChordSpec {
    pub fn new(root: ChordRoot, quality: Quality) -> Self {
        ChordSpec {
            root,
            quality,
            extensions: Extensions::default(),
        }
    }

    pub fn on_degree(key: Key, degree: u8, quality: Quality) -> Self {
        ChordSpec::new(
            ChordRoot::Degree {
                key,
                degree,
                alteration: 0,
            },
            quality,
        )
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Resolve the root pitch class. A root that cannot be resolved is an
    /// error; the engine never guesses one.
    pub fn resolve_root(&self) -> Result<PitchClass, VoicingError> {
        match self.root {
            ChordRoot::PitchClass(pc) => Ok(pc),
            ChordRoot::Degree {
                key,
                degree,
                alteration,
            } => key
                .degree_root(degree, alteration)
                .ok_or(VoicingError::InvalidScaleDegree { degree }),
        }
    }

    pub fn chord_type(&self) -> ChordType {
        ChordType::derive(self.quality, &self.extensions)
    }
}

/// Function of a tone within its chord, in descending structural weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordRole {
    Root,
    Third,
    Fifth,
    Seventh,
    Ninth,
    Eleventh,
    Thirteenth,
    Other,
}

/// A classified chord tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChordTone {
    pub pitch_class: PitchClass,
    /// Ascending interval above the root, 0-11.
    pub interval: u8,
    pub role: ChordRole,
    pub priority: f64,
}

/// Classified tones keyed by role. At most one tone per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordTones {
    tones: BTreeMap<ChordRole, ChordTone>,
}

impl ChordTones {
    pub fn get(&self, role: ChordRole) -> Option<&ChordTone> {
        self.tones.get(&role)
    }

    pub fn pitch_class(&self, role: ChordRole) -> Option<PitchClass> {
        self.get(role).map(|t| t.pitch_class)
    }

    /// Tones in role order (root first).
    pub fn iter(&self) -> impl Iterator<Item = &ChordTone> {
        self.tones.values()
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Insert a tone, keeping whichever of two same-role tones has the higher
    /// priority. On a tie the tone already present stays.
    fn insert(&mut self, tone: ChordTone) {
        match self.tones.get(&tone.role) {
            Some(existing) if existing.priority >= tone.priority => {}
            _ => {
                self.tones.insert(tone.role, tone);
            }
        }
    }
}

/// Fixed interval → (role, priority) table.
fn role_for_interval(interval: u8, has_extensions: bool) -> (ChordRole, f64) {
    match interval {
        0 => (ChordRole::Root, 100.0),
        3 | 4 => (ChordRole::Third, 95.0),
        6 | 7 => (ChordRole::Fifth, if has_extensions { 60.0 } else { 80.0 }),
        10 | 11 => (ChordRole::Seventh, 90.0),
        1 | 2 => (ChordRole::Ninth, 75.0),
        5 => (ChordRole::Eleventh, 55.0),
        8 | 9 => (ChordRole::Thirteenth, 80.0),
        _ => (ChordRole::Other, 50.0),
    }
}

/// Classify the tones of a chord built on `root`.
pub fn classify_chord_tones(root: PitchClass, quality: Quality, extensions: &Extensions) -> ChordTones {
    let (third, fifth, seventh) = quality.intervals();

    // Suspensions replace the third.
    let third = if extensions.sus4 {
        5
    } else if extensions.sus2 {
        2
    } else {
        third
    };

    let mut offsets: Vec<i32> = vec![0, third as i32, fifth as i32];
    offsets.extend(seventh.map(|s| s as i32));
    offsets.extend(extensions.ninth());
    offsets.extend(extensions.eleventh());
    offsets.extend(extensions.thirteenth());

    let has_extensions = extensions.any();
    let mut tones = ChordTones::default();
    let mut seen = [false; 12];

    for offset in offsets {
        let pc = root.transpose(offset);
        if seen[pc.value() as usize] {
            continue;
        }
        seen[pc.value() as usize] = true;

        let interval = pc.interval_from(root);
        let (role, priority) = role_for_interval(interval, has_extensions);
        tones.insert(ChordTone {
            pitch_class: pc,
            interval,
            role,
            priority,
        });
    }

    tones
}

/// Shape of a chord for shell voicing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordType {
    Triad,
    Seventh,
    Ninth,
    Eleventh,
    Thirteenth,
}

impl ChordType {
    /// Highest extension wins: 13th > 11th > 9th > 7th > triad.
    pub fn derive(quality: Quality, extensions: &Extensions) -> Self {
        if extensions.add13 || extensions.flat13 {
            ChordType::Thirteenth
        } else if extensions.add11 || extensions.sharp11 {
            ChordType::Eleventh
        } else if extensions.add9 || extensions.flat9 || extensions.sharp9 {
            ChordType::Ninth
        } else if quality.has_seventh() {
            ChordType::Seventh
        } else {
            ChordType::Triad
        }
    }
}
