// Counterpoint analysis: voice lines in, violations and a summary score out.
//
// The analyzer validates its config once, then for each request:
//
//   validate lines → build snapshots → run enabled detectors → sort by beat
//     → summarize
//
// Detectors run in a fixed order (parallels, hidden, crossing, overlap,
// spacing, range) and the final sort is stable, so violations at the same
// beat keep that order. A disabled detector is not called at all. Nothing is
// carried between requests; every call recomputes from scratch.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::line::VoiceLine;
use crate::rules::{self, PerfectInterval};
use crate::snapshot::build_snapshots;
use crate::violation::{Severity, Violation, ViolationKind};
use crate::voice::VoicePart;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Counts and score for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub counts_by_severity: BTreeMap<Severity, usize>,
    pub counts_by_type: BTreeMap<ViolationKind, usize>,
    pub is_valid: bool,
    /// 100 minus 20 per error, 5 per warning, 1 per info, floored at 0.
    pub score: u32,
}

impl Summary {
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut counts_by_severity = BTreeMap::new();
        let mut counts_by_type = BTreeMap::new();
        let mut penalty: u32 = 0;
        for v in violations {
            *counts_by_severity.entry(v.severity).or_insert(0) += 1;
            *counts_by_type.entry(v.kind).or_insert(0) += 1;
            penalty = penalty.saturating_add(v.severity.penalty());
        }
        Summary {
            is_valid: !counts_by_severity.contains_key(&Severity::Error),
            counts_by_severity,
            counts_by_type,
            score: 100u32.saturating_sub(penalty),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.counts_by_type.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ascending by beat.
    pub violations: Vec<Violation>,
    pub summary: Summary,
}

impl AnalysisResult {
    pub fn from_violations(mut violations: Vec<Violation>) -> Self {
        violations.sort_by(|a, b| a.beat.total_cmp(&b.beat));
        let summary = Summary::from_violations(&violations);
        AnalysisResult { violations, summary }
    }

    /// Every violation that names `note_id`.
    pub fn violations_for_note<'a>(&'a self, note_id: &str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.involves_note(note_id))
    }

    /// The worst violation on a note, first emitted on ties.
    pub fn most_severe_for_note(&self, note_id: &str) -> Option<&Violation> {
        most_severe_of(self.violations_for_note(note_id))
    }

    pub fn most_severe(&self) -> Option<&Violation> {
        most_severe_of(self.violations.iter())
    }
}

fn most_severe_of<'a>(violations: impl Iterator<Item = &'a Violation>) -> Option<&'a Violation> {
    violations.fold(None, |best: Option<&Violation>, v| match best {
        Some(b) if b.severity >= v.severity => Some(b),
        _ => Some(v),
    })
}

/// Runs counterpoint analysis under one validated configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Analyzer { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a set of voice lines. Fails only if a line breaks the
    /// note-sequence invariants.
    pub fn analyze(&self, lines: &BTreeMap<VoicePart, VoiceLine>) -> Result<AnalysisResult, AnalysisError> {
        for (part, line) in lines {
            line.validate(*part)?;
        }

        let config = &self.config;
        let snapshots = build_snapshots(lines);
        let mut violations = Vec::new();

        if config.check_parallel_fifths {
            violations.extend(rules::detect_parallels(&snapshots, PerfectInterval::Fifth));
        }
        if config.check_parallel_octaves {
            violations.extend(rules::detect_parallels(&snapshots, PerfectInterval::Octave));
        }
        if config.check_hidden_fifths {
            violations.extend(rules::detect_hidden(&snapshots, PerfectInterval::Fifth, config.strictness));
        }
        if config.check_hidden_octaves {
            violations.extend(rules::detect_hidden(&snapshots, PerfectInterval::Octave, config.strictness));
        }
        if config.check_voice_crossing {
            violations.extend(rules::detect_voice_crossing(&snapshots));
        }
        if config.check_voice_overlap {
            violations.extend(rules::detect_voice_overlap(&snapshots));
        }
        if config.check_spacing {
            violations.extend(rules::detect_spacing(
                &snapshots,
                config.max_soprano_alto_spacing,
                config.max_alto_tenor_spacing,
            ));
        }
        if config.check_range {
            violations.extend(rules::detect_range(lines, &config.ranges, config.warn_on_extended_range));
        }

        let result = AnalysisResult::from_violations(violations);
        debug!(
            snapshots = snapshots.len(),
            violations = result.violations.len(),
            score = result.summary.score,
            valid = result.summary.is_valid,
            "analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::MelodicNote;
    use pretty_assertions::assert_eq;

    fn line(notes: &[(&str, u8, f64, f64)]) -> VoiceLine {
        VoiceLine::new(
            notes
                .iter()
                .map(|(id, pitch, start, dur)| MelodicNote::new(*id, *pitch, *start, *dur))
                .collect(),
        )
    }

    #[test]
    fn test_empty_progression_is_perfect() {
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze(&BTreeMap::new()).unwrap();
        assert!(result.violations.is_empty());
        assert_eq!(result.summary.score, 100);
        assert!(result.summary.is_valid);
        assert!(result.most_severe().is_none());
    }

    #[test]
    fn test_disabled_detectors_report_nothing() {
        // Bass far below its range, moving in parallel with the soprano.
        let lines = BTreeMap::from([
            (VoicePart::Soprano, line(&[("s1", 72, 0.0, 1.0), ("s2", 74, 1.0, 1.0)])),
            (VoicePart::Bass, line(&[("b1", 30, 0.0, 1.0), ("b2", 32, 1.0, 1.0)])),
        ]);
        let analyzer = Analyzer::new(AnalysisConfig::none_enabled()).unwrap();
        let result = analyzer.analyze(&lines).unwrap();
        assert!(result.violations.is_empty());
        assert_eq!(result.summary.score, 100);
    }

    #[test]
    fn test_sorted_by_beat_and_looked_up_by_note() {
        let lines = BTreeMap::from([
            (VoicePart::Soprano, line(&[("s1", 72, 0.0, 1.0), ("s2", 74, 1.0, 1.0)])),
            (VoicePart::Bass, line(&[("b1", 65, 0.0, 1.0), ("b2", 67, 1.0, 1.0)])),
        ]);
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze(&lines).unwrap();

        assert!(result.violations.windows(2).all(|w| w[0].beat <= w[1].beat));
        assert_eq!(result.summary.count_of(ViolationKind::ParallelFifths), 1);
        assert!(!result.summary.is_valid);

        // b1 at 65 sits above the bass ceiling (62).
        let worst_b1 = result.most_severe_for_note("b1").unwrap();
        assert_eq!(worst_b1.kind, ViolationKind::Range);
        assert_eq!(worst_b1.severity, Severity::Error);

        let on_s2: Vec<ViolationKind> = result.violations_for_note("s2").map(|v| v.kind).collect();
        assert_eq!(on_s2, vec![ViolationKind::ParallelFifths]);
        assert!(result.most_severe_for_note("nope").is_none());
    }

    #[test]
    fn test_score_formula() {
        let summary = Summary::from_violations(&[]);
        assert_eq!(summary.score, 100);

        let lines = BTreeMap::from([(
            VoicePart::Tenor,
            line(&[("t1", 10, 0.0, 1.0), ("t2", 11, 1.0, 1.0), ("t3", 68, 2.0, 1.0)]),
        )]);
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze(&lines).unwrap();
        // Two errors below the floor, one warning above comfortable.
        assert_eq!(result.summary.count(Severity::Error), 2);
        assert_eq!(result.summary.count(Severity::Warning), 1);
        assert_eq!(result.summary.score, 100 - 40 - 5);
    }

    #[test]
    fn test_invalid_lines_rejected() {
        let lines = BTreeMap::from([(
            VoicePart::Alto,
            line(&[("a1", 65, 0.0, 2.0), ("a2", 67, 1.0, 1.0)]),
        )]);
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
        assert!(matches!(
            analyzer.analyze(&lines),
            Err(AnalysisError::OverlappingNotes { .. })
        ));
    }
}
