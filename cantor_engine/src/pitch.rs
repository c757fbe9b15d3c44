// Pitch primitives: pitch classes, absolute pitches, and interval helpers.
//
// Absolute pitches are MIDI note numbers (`u8`, C4 = 60). Pitch classes are
// octave-agnostic semitone classes 0-11 wrapped in `PitchClass` so that all
// mod-12 arithmetic goes through one place. Note names ("C4", "Eb3") are a
// presentation concern only; nothing inside the engine compares names.
//
// Used by chord.rs for chord-tone arithmetic, octave.rs for candidate
// generation, and rules.rs for interval classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute pitch as a MIDI note number.
pub type Pitch = u8;

/// One of the 12 equal-tempered semitone classes (0 = C, 1 = C#/Db, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const D: PitchClass = PitchClass(2);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);
    pub const B: PitchClass = PitchClass(11);

    /// Build a pitch class from a value that must already be in 0..12.
    pub fn new(value: u8) -> Option<Self> {
        (value < 12).then_some(PitchClass(value))
    }

    /// Reduce any signed semitone count mod 12.
    pub fn wrapping(semitones: i32) -> Self {
        PitchClass(semitones.rem_euclid(12) as u8)
    }

    /// Pitch class of an absolute pitch.
    pub fn of(pitch: Pitch) -> Self {
        PitchClass(pitch % 12)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Transpose by a signed number of semitones.
    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::wrapping(self.0 as i32 + semitones)
    }

    /// Ascending interval from `root` to `self`, in 0..12.
    pub fn interval_from(self, root: PitchClass) -> u8 {
        (self.0 + 12 - root.0) % 12
    }

    pub fn name(self) -> &'static str {
        PC_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PitchClass::new(value).ok_or_else(|| format!("pitch class {} is out of range 0-11", value))
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> u8 {
        pc.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pitch class names as the editor spells them.
const PC_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Convert a MIDI pitch to a compact note name (e.g., "C4", "F#3").
/// Octave numbering follows the MIDI convention where 60 is C4.
pub fn pitch_name(pitch: Pitch) -> String {
    let octave = pitch as i16 / 12 - 1;
    format!("{}{}", PC_NAMES[(pitch % 12) as usize], octave)
}

/// Musical interval helpers over absolute pitches.
pub mod interval {
    use super::Pitch;

    /// Signed distance in semitones. Positive means `to` is higher.
    pub fn semitones(from: Pitch, to: Pitch) -> i16 {
        to as i16 - from as i16
    }

    /// Interval from `lower` up to `upper`, reduced mod 12 (0-11).
    /// A voice pair that has crossed yields the complementary class.
    pub fn class_above(lower: Pitch, upper: Pitch) -> u8 {
        semitones(lower, upper).rem_euclid(12) as u8
    }

    /// Direction of a melodic move: 1 up, -1 down, 0 static.
    pub fn direction(from: Pitch, to: Pitch) -> i8 {
        semitones(from, to).signum() as i8
    }

    /// True when both moves go the same way and neither is static.
    pub fn is_similar_motion(a_from: Pitch, a_to: Pitch, b_from: Pitch, b_to: Pitch) -> bool {
        let a = direction(a_from, a_to);
        a != 0 && a == direction(b_from, b_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_arithmetic() {
        assert_eq!(PitchClass::wrapping(-1), PitchClass::B);
        assert_eq!(PitchClass::G.transpose(14), PitchClass::A);
        assert_eq!(PitchClass::C.interval_from(PitchClass::G), 5);
        assert_eq!(PitchClass::of(67), PitchClass::G);
        assert!(PitchClass::new(12).is_none());
    }

    #[test]
    fn test_pitch_class_serde_rejects_out_of_range() {
        let pc: PitchClass = serde_json::from_str("7").unwrap();
        assert_eq!(pc, PitchClass::G);
        assert!(serde_json::from_str::<PitchClass>("12").is_err());
    }

    #[test]
    fn test_pitch_names() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(63), "Eb4");
        assert_eq!(pitch_name(40), "E2");
        assert_eq!(pitch_name(0), "C-1");
    }

    #[test]
    fn test_interval_helpers() {
        assert_eq!(interval::class_above(65, 72), 7); // F4 up to C5
        assert_eq!(interval::class_above(67, 76), 9); // G4 up to E5
        assert_eq!(interval::class_above(72, 65), 5); // crossed pair
        assert_eq!(interval::class_above(48, 72), 0);
        assert!(interval::is_similar_motion(60, 62, 53, 55));
        assert!(!interval::is_similar_motion(60, 62, 55, 53));
        assert!(!interval::is_similar_motion(60, 60, 53, 55));
    }
}
