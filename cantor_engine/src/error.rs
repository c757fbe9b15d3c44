// Error types for configuration, voicing, and analysis.
//
// Expected absences (a missing optional chord tone, a silent voice) are not
// errors anywhere in the engine; they are handled by omission. These enums
// cover only inputs the engine refuses to work with.

use crate::pitch::Pitch;
use crate::voice::VoicePart;

/// Invalid configuration, raised once at setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{part} range is inverted: low {low} > high {high}")]
    InvalidRange { part: VoicePart, low: Pitch, high: Pitch },

    #[error("{part} comfortable range {comfortable_low}-{comfortable_high} is not inside its absolute range")]
    ComfortableOutsideAbsolute {
        part: VoicePart,
        comfortable_low: Pitch,
        comfortable_high: Pitch,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chord that cannot be voiced.
#[derive(Debug, thiserror::Error)]
pub enum VoicingError {
    #[error("scale degree {degree} is outside 1-7")]
    InvalidScaleDegree { degree: u8 },

    #[error("chord {index}: {source}")]
    Chord {
        index: usize,
        #[source]
        source: Box<VoicingError>,
    },
}

/// Voice lines that violate the note-sequence invariants.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{part} note '{note_id}' has invalid duration {duration}")]
    InvalidDuration {
        part: VoicePart,
        note_id: String,
        duration: f64,
    },

    #[error("{part} note '{note_id}' starts at invalid beat {start_beat}")]
    InvalidStart {
        part: VoicePart,
        note_id: String,
        start_beat: f64,
    },

    #[error("{part} notes '{first}' and '{second}' overlap")]
    OverlappingNotes {
        part: VoicePart,
        first: String,
        second: String,
    },
}
