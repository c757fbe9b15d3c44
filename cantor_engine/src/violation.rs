// Violation data model shared by the rule detectors and the analyzer.
//
// Every rule violation carries enough to draw a badge on the editor's notes:
// the beat, the ids of the notes involved, and for pair rules the two voices.
// Kinds and severities are closed enums so the summary's per-type counts and
// the editor's icon lookup are exhaustive matches.

use crate::voice::VoicePart;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    ParallelFifths,
    ParallelOctaves,
    HiddenFifths,
    HiddenOctaves,
    VoiceCrossing,
    VoiceOverlap,
    #[serde(rename = "spacingViolation")]
    Spacing,
    #[serde(rename = "rangeViolation")]
    Range,
}

impl ViolationKind {
    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::ParallelFifths => "parallel fifths",
            ViolationKind::ParallelOctaves => "parallel octaves",
            ViolationKind::HiddenFifths => "hidden fifths",
            ViolationKind::HiddenOctaves => "hidden octaves",
            ViolationKind::VoiceCrossing => "voice crossing",
            ViolationKind::VoiceOverlap => "voice overlap",
            ViolationKind::Spacing => "spacing",
            ViolationKind::Range => "range",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered so that `max()` picks the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Points taken off the 100-point score per violation.
    pub fn penalty(self) -> u32 {
        match self {
            Severity::Error => 20,
            Severity::Warning => 5,
            Severity::Info => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Two voices, the nominally higher one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePair {
    pub upper: VoicePart,
    pub lower: VoicePart,
}

impl VoicePair {
    pub fn new(upper: VoicePart, lower: VoicePart) -> Self {
        VoicePair { upper, lower }
    }
}

impl fmt::Display for VoicePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.upper, self.lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeSubtype {
    BelowAbsolute,
    AboveAbsolute,
    BelowComfortable,
    AboveComfortable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub severity: Severity,
    pub beat: f64,
    pub note_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_pair: Option<VoicePair>,
    /// The single voice, for per-note rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoicePart>,
    /// Interval class in semitones (0-11), for interval rules; the actual
    /// gap for spacing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_subtype: Option<RangeSubtype>,
    pub description: String,
    pub suggestion: String,
}

impl Violation {
    pub fn involves_note(&self, note_id: &str) -> bool {
        self.note_ids.iter().any(|id| id == note_id)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] beat {}: {}", self.severity, self.beat, self.description)
    }
}
