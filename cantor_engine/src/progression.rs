// Progression files: the JSON input of the `cantor` binary.
//
// A progression bundles the chords to voice, how long each chord lasts, and
// both engine configs. Every field but `chords` is optional.
//
//   {
//     "chords": [ { "root": { "pitchClass": 0 }, "quality": "major" }, ... ],
//     "beatsPerChord": 4,
//     "voicing": { "voiceCount": 4, "style": "classical" },
//     "analysis": { "strictness": "lenient" }
//   }

use crate::analysis::{AnalysisResult, Analyzer};
use crate::chord::ChordSpec;
use crate::config::{AnalysisConfig, VoicingConfig};
use crate::error::ConfigError;
use crate::line::voice_lines_from_voicings;
use crate::voicing::{Voicer, Voicing};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_beats_per_chord() -> f64 {
    4.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub chords: Vec<ChordSpec>,
    #[serde(default = "default_beats_per_chord")]
    pub beats_per_chord: f64,
    #[serde(default)]
    pub voicing: VoicingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Progression {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

/// Voicings and analysis of one progression.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub voicings: Vec<Voicing>,
    pub analysis: AnalysisResult,
}

impl Progression {
    /// Voice every chord in order, then analyze the resulting block-chord
    /// lines.
    pub fn render(&self) -> Result<Rendered, Box<dyn std::error::Error>> {
        let voicer = Voicer::new(self.voicing.clone())?;
        let analyzer = Analyzer::new(self.analysis.clone())?;
        let voicings = voicer.voice_progression(&self.chords, None)?;
        let lines = voice_lines_from_voicings(&voicings, self.beats_per_chord);
        let analysis = analyzer.analyze(&lines)?;
        Ok(Rendered { voicings, analysis })
    }
}
