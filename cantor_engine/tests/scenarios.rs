// End-to-end scenarios across voicing and analysis.
//
// These drive the public API only: voice lines built by hand or from the
// voicer, analyzed with a default or tailored config.

use cantor_engine::analysis::{AnalysisResult, Analyzer, Summary};
use cantor_engine::chord::{ChordSpec, Extensions, Quality};
use cantor_engine::config::{AnalysisConfig, VoicingConfig};
use cantor_engine::line::{MelodicNote, VoiceLine, voice_lines_from_voicings};
use cantor_engine::mode::{Key, Mode};
use cantor_engine::pitch::PitchClass;
use cantor_engine::violation::{RangeSubtype, Severity, Violation, ViolationKind, VoicePair};
use cantor_engine::voice::VoicePart;
use cantor_engine::voicing::Voicer;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn two_note_line(part: &str, first: u8, second: u8) -> VoiceLine {
    VoiceLine::new(vec![
        MelodicNote::new(format!("{}1", part), first, 0.0, 1.0),
        MelodicNote::new(format!("{}2", part), second, 1.0, 1.0),
    ])
}

fn parallels_only() -> AnalysisConfig {
    AnalysisConfig {
        check_parallel_fifths: true,
        check_parallel_octaves: true,
        ..AnalysisConfig::none_enabled()
    }
}

#[test]
fn test_parallel_fifths_between_outer_voices() {
    // C5/F4 -> D5/G4, both ascending.
    let lines = BTreeMap::from([
        (VoicePart::Soprano, two_note_line("s", 72, 74)),
        (VoicePart::Bass, two_note_line("b", 65, 67)),
    ]);
    let analyzer = Analyzer::new(parallels_only()).unwrap();
    let result = analyzer.analyze(&lines).unwrap();

    let fifths: Vec<&Violation> = result
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::ParallelFifths)
        .collect();
    assert_eq!(fifths.len(), 1);
    assert_eq!(fifths[0].severity, Severity::Error);
    assert_eq!(fifths[0].voice_pair, Some(VoicePair::new(VoicePart::Soprano, VoicePart::Bass)));
    assert_eq!(fifths[0].interval, Some(7));
    assert_eq!(fifths[0].beat, 1.0);
}

#[test]
fn test_third_is_not_parallel_fifth() {
    // C5/F4 -> E5/G4 lands on a third.
    let lines = BTreeMap::from([
        (VoicePart::Soprano, two_note_line("s", 72, 76)),
        (VoicePart::Bass, two_note_line("b", 65, 67)),
    ]);
    let analyzer = Analyzer::new(parallels_only()).unwrap();
    let result = analyzer.analyze(&lines).unwrap();
    assert_eq!(result.summary.count_of(ViolationKind::ParallelFifths), 0);
}

#[test]
fn test_bass_below_absolute_range() {
    let lines = BTreeMap::from([(
        VoicePart::Bass,
        VoiceLine::new(vec![MelodicNote::new("b1", 30, 0.0, 4.0)]),
    )]);
    let config = AnalysisConfig {
        check_range: true,
        ..AnalysisConfig::none_enabled()
    };
    let result = Analyzer::new(config).unwrap().analyze(&lines).unwrap();

    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.kind, ViolationKind::Range);
    assert_eq!(v.severity, Severity::Error);
    assert_eq!(v.range_subtype, Some(RangeSubtype::BelowAbsolute));
    assert_eq!(v.note_ids, vec!["b1".to_string()]);
    assert_eq!(result.most_severe_for_note("b1").map(|v| v.id.clone()), Some(v.id.clone()));
}

#[test]
fn test_each_error_costs_twenty_points() {
    let lines = BTreeMap::from([(
        VoicePart::Bass,
        VoiceLine::new(vec![MelodicNote::new("b1", 30, 0.0, 4.0)]),
    )]);
    let base = Analyzer::new(AnalysisConfig::default()).unwrap().analyze(&lines).unwrap();
    let mut violations = base.violations.clone();

    let mut previous = base.summary.score;
    for i in 0..6 {
        let mut extra = base.violations[0].clone();
        extra.id = format!("extra-{}", i);
        violations.push(extra);
        let summary = Summary::from_violations(&violations);
        assert_eq!(summary.score, previous.saturating_sub(20));
        previous = summary.score;
    }
    assert_eq!(previous, 0);
    assert!(!AnalysisResult::from_violations(violations).summary.is_valid);
}

#[test]
fn test_c_f_g_c_progression() {
    let key = Key::new(PitchClass::C, Mode::Major);
    let chords = [
        ChordSpec::on_degree(key, 1, Quality::Major),
        ChordSpec::on_degree(key, 4, Quality::Maj7),
        ChordSpec::on_degree(key, 5, Quality::Dom7),
        ChordSpec::on_degree(key, 1, Quality::Major).with_extensions(Extensions {
            add9: true,
            ..Default::default()
        }),
    ];
    let voicer = Voicer::new(VoicingConfig::default()).unwrap();
    let voicings = voicer.voice_progression(&chords, None).unwrap();
    assert_eq!(voicings.len(), 4);

    let soprano = VoicePart::Soprano.default_range();
    for voicing in &voicings {
        let pitch = voicing.pitch(VoicePart::Soprano).unwrap();
        assert!(soprano.contains(pitch as i16), "soprano {} out of range", pitch);
        for (part, pitch) in &voicing.pitches {
            assert!(part.default_range().contains(*pitch as i16), "{} at {}", part, pitch);
        }
    }

    // The add9 chord drops its fifth.
    let last = &voicings[3];
    assert!(last.pitches.values().all(|p| PitchClass::of(*p) != PitchClass::G));
    assert!(last.pitches.values().any(|p| PitchClass::of(*p) == PitchClass::D));

    // The engine's own output can be analyzed directly.
    let lines = voice_lines_from_voicings(&voicings, 4.0);
    let result = Analyzer::new(AnalysisConfig::default()).unwrap().analyze(&lines).unwrap();
    assert!(result.violations.windows(2).all(|w| w[0].beat <= w[1].beat));
    let range_errors = result
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::Range && v.severity == Severity::Error)
        .count();
    assert_eq!(range_errors, 0, "{:#?}", result.violations);
}

#[test]
fn test_voicing_is_deterministic_across_runs() {
    let key = Key::new(PitchClass::D, Mode::Dorian);
    let chords = [
        ChordSpec::on_degree(key, 1, Quality::Min7),
        ChordSpec::on_degree(key, 4, Quality::Dom7),
        ChordSpec::on_degree(key, 7, Quality::Maj7),
    ];
    let voicer = Voicer::new(VoicingConfig::default()).unwrap();
    let a = voicer.voice_progression(&chords, None).unwrap();
    let b = voicer.voice_progression(&chords, None).unwrap();
    assert_eq!(a, b);
}
