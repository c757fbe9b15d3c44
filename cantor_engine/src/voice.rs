// Voice parts and their ranges.
//
// A choral texture is either four parts (SATB) or eight parts (each section
// divided into I and II). Every part has an absolute range it must never
// leave and a comfortable sub-range that the octave fitter prefers and the
// range rule optionally warns about. Ranges are MIDI pitch numbers.
//
// Slot order matters in two places: the shell voicing tables list tones from
// the bottom voice upward, and the ordering enforcer walks adjacent parts
// bottom-up. `VoiceCount::parts_bottom_up` is the single source of that order.

use crate::error::ConfigError;
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single voice part. 4-part and 8-part layouts use disjoint variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoicePart {
    Soprano,
    Alto,
    Tenor,
    Bass,
    SopranoI,
    SopranoII,
    AltoI,
    AltoII,
    TenorI,
    TenorII,
    BassI,
    BassII,
}

impl VoicePart {
    pub const SATB: [VoicePart; 4] = [
        VoicePart::Soprano,
        VoicePart::Alto,
        VoicePart::Tenor,
        VoicePart::Bass,
    ];

    pub const EIGHT: [VoicePart; 8] = [
        VoicePart::SopranoI,
        VoicePart::SopranoII,
        VoicePart::AltoI,
        VoicePart::AltoII,
        VoicePart::TenorI,
        VoicePart::TenorII,
        VoicePart::BassI,
        VoicePart::BassII,
    ];

    /// Built-in absolute and comfortable ranges.
    pub fn default_range(self) -> VoiceRange {
        match self {
            VoicePart::Soprano => VoiceRange::new(60, 81, 62, 77), // C4–A5
            VoicePart::Alto => VoiceRange::new(53, 74, 55, 72),    // F3–D5
            VoicePart::Tenor => VoiceRange::new(48, 69, 50, 67),   // C3–A4
            VoicePart::Bass => VoiceRange::new(40, 62, 43, 60),    // E2–D4
            VoicePart::SopranoI => VoiceRange::new(62, 81, 64, 79),
            VoicePart::SopranoII => VoiceRange::new(60, 79, 62, 76),
            VoicePart::AltoI => VoiceRange::new(55, 74, 57, 72),
            VoicePart::AltoII => VoiceRange::new(53, 72, 55, 69),
            VoicePart::TenorI => VoiceRange::new(50, 69, 52, 67),
            VoicePart::TenorII => VoiceRange::new(48, 67, 50, 64),
            VoicePart::BassI => VoiceRange::new(43, 64, 45, 62),
            VoicePart::BassII => VoiceRange::new(40, 62, 41, 58),
        }
    }

    /// Highest part of its layout.
    pub fn is_top(self) -> bool {
        matches!(self, VoicePart::Soprano | VoicePart::SopranoI)
    }

    /// Lowest part of its layout.
    pub fn is_bottom(self) -> bool {
        matches!(self, VoicePart::Bass | VoicePart::BassII)
    }

    /// Identifier form, matching the JSON name ("sopranoI").
    pub fn slug(self) -> &'static str {
        match self {
            VoicePart::Soprano => "soprano",
            VoicePart::Alto => "alto",
            VoicePart::Tenor => "tenor",
            VoicePart::Bass => "bass",
            VoicePart::SopranoI => "sopranoI",
            VoicePart::SopranoII => "sopranoII",
            VoicePart::AltoI => "altoI",
            VoicePart::AltoII => "altoII",
            VoicePart::TenorI => "tenorI",
            VoicePart::TenorII => "tenorII",
            VoicePart::BassI => "bassI",
            VoicePart::BassII => "bassII",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoicePart::Soprano => "soprano",
            VoicePart::Alto => "alto",
            VoicePart::Tenor => "tenor",
            VoicePart::Bass => "bass",
            VoicePart::SopranoI => "soprano I",
            VoicePart::SopranoII => "soprano II",
            VoicePart::AltoI => "alto I",
            VoicePart::AltoII => "alto II",
            VoicePart::TenorI => "tenor I",
            VoicePart::TenorII => "tenor II",
            VoicePart::BassI => "bass I",
            VoicePart::BassII => "bass II",
        }
    }
}

impl fmt::Display for VoicePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Absolute range of a voice plus its comfortable sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRange {
    pub low: Pitch,
    pub high: Pitch,
    pub comfortable_low: Pitch,
    pub comfortable_high: Pitch,
}

impl VoiceRange {
    pub const fn new(low: Pitch, high: Pitch, comfortable_low: Pitch, comfortable_high: Pitch) -> Self {
        VoiceRange {
            low,
            high,
            comfortable_low,
            comfortable_high,
        }
    }

    /// Check `low <= high` and that the comfortable range sits inside it.
    pub fn validate(&self, part: VoicePart) -> Result<(), ConfigError> {
        if self.low > self.high {
            return Err(ConfigError::InvalidRange {
                part,
                low: self.low,
                high: self.high,
            });
        }
        if self.comfortable_low > self.comfortable_high
            || self.comfortable_low < self.low
            || self.comfortable_high > self.high
        {
            return Err(ConfigError::ComfortableOutsideAbsolute {
                part,
                comfortable_low: self.comfortable_low,
                comfortable_high: self.comfortable_high,
            });
        }
        Ok(())
    }

    pub fn contains(&self, pitch: i16) -> bool {
        pitch >= self.low as i16 && pitch <= self.high as i16
    }

    pub fn is_comfortable(&self, pitch: i16) -> bool {
        pitch >= self.comfortable_low as i16 && pitch <= self.comfortable_high as i16
    }

    pub fn midpoint(&self) -> f64 {
        (self.low as f64 + self.high as f64) / 2.0
    }
}

/// Number of voices in the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VoiceCount {
    Four,
    Eight,
}

impl VoiceCount {
    pub fn count(self) -> usize {
        match self {
            VoiceCount::Four => 4,
            VoiceCount::Eight => 8,
        }
    }

    /// Divisi parts may double each other at the unison.
    pub fn allows_unison(self) -> bool {
        matches!(self, VoiceCount::Eight)
    }

    /// Parts from the lowest voice to the highest. Shell voicing tables and
    /// the ordering enforcer both index slots in this order.
    pub fn parts_bottom_up(self) -> &'static [VoicePart] {
        const FOUR: [VoicePart; 4] = [
            VoicePart::Bass,
            VoicePart::Tenor,
            VoicePart::Alto,
            VoicePart::Soprano,
        ];
        const EIGHT: [VoicePart; 8] = [
            VoicePart::BassII,
            VoicePart::BassI,
            VoicePart::TenorII,
            VoicePart::TenorI,
            VoicePart::AltoII,
            VoicePart::AltoI,
            VoicePart::SopranoII,
            VoicePart::SopranoI,
        ];
        match self {
            VoiceCount::Four => &FOUR,
            VoiceCount::Eight => &EIGHT,
        }
    }
}

impl TryFrom<u8> for VoiceCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(VoiceCount::Four),
            8 => Ok(VoiceCount::Eight),
            other => Err(format!("unsupported voice count {} (expected 4 or 8)", other)),
        }
    }
}

impl From<VoiceCount> for u8 {
    fn from(count: VoiceCount) -> u8 {
        count.count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges_are_valid() {
        for part in VoicePart::SATB.iter().chain(VoicePart::EIGHT.iter()) {
            let range = part.default_range();
            assert!(range.validate(*part).is_ok(), "{} default range invalid", part);
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let range = VoiceRange::new(70, 60, 62, 68);
        assert!(matches!(
            range.validate(VoicePart::Alto),
            Err(ConfigError::InvalidRange { .. })
        ));
        let range = VoiceRange::new(60, 70, 58, 68);
        assert!(matches!(
            range.validate(VoicePart::Alto),
            Err(ConfigError::ComfortableOutsideAbsolute { .. })
        ));
    }

    #[test]
    fn test_parts_bottom_up() {
        let parts = VoiceCount::Four.parts_bottom_up();
        assert_eq!(parts.first(), Some(&VoicePart::Bass));
        assert_eq!(parts.last(), Some(&VoicePart::Soprano));
        assert_eq!(VoiceCount::Eight.parts_bottom_up().len(), 8);
    }

    #[test]
    fn test_voice_part_serde_names() {
        for part in VoicePart::SATB.iter().chain(VoicePart::EIGHT.iter()) {
            assert_eq!(serde_json::to_string(part).unwrap(), format!("\"{}\"", part.slug()));
        }
        let count: VoiceCount = serde_json::from_str("8").unwrap();
        assert_eq!(count, VoiceCount::Eight);
        assert!(serde_json::from_str::<VoiceCount>("6").is_err());
    }
}
