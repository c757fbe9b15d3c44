// Engine configuration: voicing options, rule toggles, and voice ranges.
//
// Both configs are plain value objects, loadable from JSON with every field
// optional (missing fields take their defaults). The engine never reads
// configuration from anywhere else and keeps no configuration state of its
// own: a `Voicer` or `Analyzer` owns the config it was built with.
//
// Validation happens once, when a `Voicer` or `Analyzer` is constructed.
// Per-chord and per-note code assumes a valid config.

use crate::error::ConfigError;
use crate::shell::VoicingStyle;
use crate::voice::{VoiceCount, VoicePart, VoiceRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-part range overrides on top of `VoicePart::default_range`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceRanges {
    overrides: BTreeMap<VoicePart, VoiceRange>,
}

impl VoiceRanges {
    pub fn range(&self, part: VoicePart) -> VoiceRange {
        self.overrides
            .get(&part)
            .copied()
            .unwrap_or_else(|| part.default_range())
    }

    pub fn set(&mut self, part: VoicePart, range: VoiceRange) {
        self.overrides.insert(part, range);
    }

    /// Validate every override. Defaults are valid by construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (part, range) in &self.overrides {
            range.validate(*part)?;
        }
        Ok(())
    }
}

/// Options for turning chords into voicings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoicingConfig {
    pub voice_count: VoiceCount,
    pub style: VoicingStyle,
    pub ranges: VoiceRanges,
}

impl Default for VoicingConfig {
    fn default() -> Self {
        VoicingConfig {
            voice_count: VoiceCount::Four,
            style: VoicingStyle::Classical,
            ranges: VoiceRanges::default(),
        }
    }
}

impl VoicingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranges.validate()
    }
}

/// How harshly hidden fifths/octaves between the outer voices are judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Strict,
    Lenient,
}

/// Rule toggles and thresholds for counterpoint analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub check_parallel_fifths: bool,
    pub check_parallel_octaves: bool,
    pub check_hidden_fifths: bool,
    pub check_hidden_octaves: bool,
    pub check_voice_crossing: bool,
    pub check_voice_overlap: bool,
    pub check_spacing: bool,
    pub check_range: bool,

    /// Largest allowed gap between soprano and alto, in semitones.
    pub max_soprano_alto_spacing: u8,
    /// Largest allowed gap between alto and tenor, in semitones.
    pub max_alto_tenor_spacing: u8,

    pub strictness: Strictness,
    /// Also warn about notes outside the comfortable range.
    pub warn_on_extended_range: bool,

    pub ranges: VoiceRanges,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            check_parallel_fifths: true,
            check_parallel_octaves: true,
            check_hidden_fifths: true,
            check_hidden_octaves: true,
            check_voice_crossing: true,
            check_voice_overlap: true,
            check_spacing: true,
            check_range: true,
            max_soprano_alto_spacing: 12,
            max_alto_tenor_spacing: 12,
            strictness: Strictness::Strict,
            warn_on_extended_range: true,
            ranges: VoiceRanges::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranges.validate()
    }

    /// A config with every rule switched off.
    pub fn none_enabled() -> Self {
        AnalysisConfig {
            check_parallel_fifths: false,
            check_parallel_octaves: false,
            check_hidden_fifths: false,
            check_hidden_octaves: false,
            check_voice_crossing: false,
            check_voice_overlap: false,
            check_spacing: false,
            check_range: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = AnalysisConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.max_soprano_alto_spacing, 12);
        assert_eq!(config.strictness, Strictness::Strict);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "checkVoiceOverlap": false,
            "strictness": "lenient",
            "ranges": { "bass": { "low": 38, "high": 60, "comfortableLow": 41, "comfortableHigh": 57 } }
        }"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert!(!config.check_voice_overlap);
        assert!(config.check_parallel_fifths);
        assert_eq!(config.strictness, Strictness::Lenient);
        assert_eq!(config.ranges.range(VoicePart::Bass).low, 38);
        assert_eq!(config.ranges.range(VoicePart::Tenor), VoicePart::Tenor.default_range());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_range_fails_validation() {
        let mut config = VoicingConfig::default();
        config.ranges.set(VoicePart::Alto, VoiceRange::new(74, 53, 55, 72));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn test_voicing_config_json() {
        let config = VoicingConfig::from_json(r#"{ "voiceCount": 8, "style": "jazz" }"#).unwrap();
        assert_eq!(config.voice_count, VoiceCount::Eight);
        assert_eq!(config.style, VoicingStyle::Jazz);
        assert!(VoicingConfig::from_json(r#"{ "voiceCount": 5 }"#).is_err());
    }
}
