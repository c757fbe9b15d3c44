// Keys and modes for resolving scale-degree chord roots.
//
// The editor describes most chords as "degree N in key K, mode M" rather
// than by an explicit root. This module holds the interval tables for the
// supported modes and turns a (key, mode, degree) triple into a root pitch
// class. A signed alteration covers borrowed and chromatic chords (bVI, #IV)
// without a separate spelling layer.
//
// Used by chord.rs when resolving `ChordRoot::Degree`.

use crate::pitch::PitchClass;
use serde::{Deserialize, Serialize};

/// Scale modes a progression may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major (ionian): W W H W W W H
    Major,
    /// Natural minor (aeolian)
    Minor,
    /// Minor with raised 6th
    Dorian,
    /// Minor with lowered 2nd
    Phrygian,
    /// Major with raised 4th
    Lydian,
    /// Major with lowered 7th
    Mixolydian,
    /// Diminished 5th above the final
    Locrian,
}

impl Mode {
    /// Semitone intervals from the tonic to each scale degree.
    /// Returns 7 intervals representing degrees 1-7.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::Locrian => [0, 1, 3, 5, 6, 8, 10],
        }
    }
}

/// A tonic plus a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Key { tonic, mode }
    }

    /// Root pitch class of the chord built on 1-based `degree`, shifted by
    /// `alteration` semitones. Returns None for degrees outside 1..=7.
    pub fn degree_root(&self, degree: u8, alteration: i8) -> Option<PitchClass> {
        if !(1..=7).contains(&degree) {
            return None;
        }
        let offset = self.mode.intervals()[(degree - 1) as usize] as i32;
        Some(self.tonic.transpose(offset + alteration as i32))
    }

    /// 1-based scale degree of a pitch class, or None if it is not in the key.
    pub fn scale_degree(&self, pc: PitchClass) -> Option<u8> {
        let iv = pc.interval_from(self.tonic);
        self.mode
            .intervals()
            .iter()
            .position(|&x| x == iv)
            .map(|d| d as u8 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major_degrees() {
        let key = Key::new(PitchClass::C, Mode::Major);
        assert_eq!(key.degree_root(1, 0), Some(PitchClass::C));
        assert_eq!(key.degree_root(4, 0), Some(PitchClass::F));
        assert_eq!(key.degree_root(5, 0), Some(PitchClass::G));
        assert_eq!(key.degree_root(7, 0), Some(PitchClass::B));
    }

    #[test]
    fn test_degree_out_of_range() {
        let key = Key::new(PitchClass::C, Mode::Major);
        assert_eq!(key.degree_root(0, 0), None);
        assert_eq!(key.degree_root(8, 0), None);
    }

    #[test]
    fn test_borrowed_flat_six() {
        // bVI in C major is Ab
        let key = Key::new(PitchClass::C, Mode::Major);
        assert_eq!(key.degree_root(6, -1), PitchClass::new(8));
    }

    #[test]
    fn test_minor_and_modal_roots() {
        let a_minor = Key::new(PitchClass::A, Mode::Minor);
        assert_eq!(a_minor.degree_root(3, 0), Some(PitchClass::C));
        let e_phrygian = Key::new(PitchClass::E, Mode::Phrygian);
        assert_eq!(e_phrygian.degree_root(2, 0), Some(PitchClass::F));
        assert_eq!(e_phrygian.scale_degree(PitchClass::F), Some(2));
        assert_eq!(e_phrygian.scale_degree(PitchClass::new(6).unwrap()), None);
    }
}
