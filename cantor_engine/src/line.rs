// Voice lines: the melodic note sequence of one part across a progression.
//
// Notes are addressed by id so that violations can point back at the
// editor's notes. Beats are fractional (a quarter note is 1.0). A note with
// no pitch is a rest. Notes in one line never overlap; `validate` checks
// that before analysis relies on it.

use crate::error::AnalysisError;
use crate::pitch::Pitch;
use crate::voice::VoicePart;
use crate::voicing::Voicing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Written accidental, kept for round-tripping with the editor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
}

/// One note (or rest) in a voice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodicNote {
    pub id: String,
    /// MIDI pitch, or None for a rest.
    pub pitch: Option<Pitch>,
    pub start_beat: f64,
    pub duration: f64,
    #[serde(default)]
    pub accidental: Option<Accidental>,
}

impl MelodicNote {
    pub fn new(id: impl Into<String>, pitch: Pitch, start_beat: f64, duration: f64) -> Self {
        MelodicNote {
            id: id.into(),
            pitch: Some(pitch),
            start_beat,
            duration,
            accidental: None,
        }
    }

    pub fn rest(id: impl Into<String>, start_beat: f64, duration: f64) -> Self {
        MelodicNote {
            id: id.into(),
            pitch: None,
            start_beat,
            duration,
            accidental: None,
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration
    }

    /// Whether `beat` falls in [start, start + duration).
    pub fn is_active_at(&self, beat: f64) -> bool {
        beat >= self.start_beat && beat < self.end_beat()
    }
}

/// All notes of one voice part, in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceLine {
    pub notes: Vec<MelodicNote>,
}

impl VoiceLine {
    pub fn new(notes: Vec<MelodicNote>) -> Self {
        VoiceLine { notes }
    }

    /// The note sounding (or resting) at `beat`, if any.
    pub fn note_at(&self, beat: f64) -> Option<&MelodicNote> {
        self.notes.iter().find(|n| n.is_active_at(beat))
    }

    /// Check durations are positive and finite, starts are finite and
    /// non-negative, and no two notes overlap.
    pub fn validate(&self, part: VoicePart) -> Result<(), AnalysisError> {
        for note in &self.notes {
            if !(note.duration > 0.0 && note.duration.is_finite()) {
                return Err(AnalysisError::InvalidDuration {
                    part,
                    note_id: note.id.clone(),
                    duration: note.duration,
                });
            }
            if !(note.start_beat >= 0.0 && note.start_beat.is_finite()) {
                return Err(AnalysisError::InvalidStart {
                    part,
                    note_id: note.id.clone(),
                    start_beat: note.start_beat,
                });
            }
        }

        let mut sorted: Vec<&MelodicNote> = self.notes.iter().collect();
        sorted.sort_by(|a, b| a.start_beat.total_cmp(&b.start_beat));
        for pair in sorted.windows(2) {
            if pair[1].start_beat < pair[0].end_beat() {
                return Err(AnalysisError::OverlappingNotes {
                    part,
                    first: pair[0].id.clone(),
                    second: pair[1].id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Turn a voiced progression into voice lines, one block chord per
/// `beats_per_chord`. Note ids are "{part}-{chord index}".
pub fn voice_lines_from_voicings(voicings: &[Voicing], beats_per_chord: f64) -> BTreeMap<VoicePart, VoiceLine> {
    let mut lines: BTreeMap<VoicePart, VoiceLine> = BTreeMap::new();
    for (index, voicing) in voicings.iter().enumerate() {
        let start = index as f64 * beats_per_chord;
        for (part, pitch) in &voicing.pitches {
            let id = format!("{}-{}", part.slug(), index);
            lines
                .entry(*part)
                .or_default()
                .notes
                .push(MelodicNote::new(id, *pitch, start, beats_per_chord));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_interval_is_half_open() {
        let note = MelodicNote::new("n1", 60, 1.0, 2.0);
        assert!(!note.is_active_at(0.5));
        assert!(note.is_active_at(1.0));
        assert!(note.is_active_at(2.5));
        assert!(!note.is_active_at(3.0));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let line = VoiceLine::new(vec![
            MelodicNote::new("a", 60, 0.0, 2.0),
            MelodicNote::new("b", 62, 1.5, 1.0),
        ]);
        assert!(matches!(
            line.validate(VoicePart::Soprano),
            Err(AnalysisError::OverlappingNotes { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_touching_notes_and_rests() {
        let line = VoiceLine::new(vec![
            MelodicNote::new("a", 60, 0.0, 1.0),
            MelodicNote::rest("r", 1.0, 1.0),
            MelodicNote::new("b", 62, 2.0, 1.0),
        ]);
        assert!(line.validate(VoicePart::Alto).is_ok());
        assert_eq!(line.note_at(1.5).map(|n| n.id.as_str()), Some("r"));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let line = VoiceLine::new(vec![MelodicNote::new("a", 60, 0.0, 0.0)]);
        assert!(matches!(
            line.validate(VoicePart::Bass),
            Err(AnalysisError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_start() {
        for start in [f64::NAN, f64::INFINITY, -1.0] {
            let line = VoiceLine::new(vec![MelodicNote::new("a", 60, start, 1.0)]);
            let err = line.validate(VoicePart::Tenor).unwrap_err();
            assert!(
                matches!(&err, AnalysisError::InvalidStart { note_id, .. } if note_id == "a"),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_validate_rejects_infinite_duration() {
        let line = VoiceLine::new(vec![MelodicNote::rest("r", 0.0, f64::INFINITY)]);
        assert!(matches!(
            line.validate(VoicePart::Soprano),
            Err(AnalysisError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_lines_from_voicings() {
        let voicings = vec![
            Voicing {
                pitches: BTreeMap::from([(VoicePart::Soprano, 72), (VoicePart::Bass, 48)]),
                unresolved: Vec::new(),
            },
            Voicing {
                pitches: BTreeMap::from([(VoicePart::Soprano, 71), (VoicePart::Bass, 43)]),
                unresolved: Vec::new(),
            },
        ];
        let lines = voice_lines_from_voicings(&voicings, 4.0);
        let bass = &lines[&VoicePart::Bass];
        assert_eq!(bass.notes.len(), 2);
        assert_eq!(bass.notes[1].id, "bass-1");
        assert_eq!(bass.notes[1].start_beat, 4.0);
        assert_eq!(bass.notes[1].pitch, Some(43));
    }

    #[test]
    fn test_note_json_uses_editor_field_names() {
        let json = r#"{ "id": "s1", "pitch": null, "startBeat": 2, "duration": 1.5, "accidental": "flat" }"#;
        let note: MelodicNote = serde_json::from_str(json).unwrap();
        assert_eq!(note.pitch, None);
        assert_eq!(note.start_beat, 2.0);
        assert_eq!(note.accidental, Some(Accidental::Flat));
    }
}
