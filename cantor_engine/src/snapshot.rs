// Beat snapshots: what every voice is sounding at each rhythmic boundary.
//
// Cross-voice rules compare voices at the same instant, but voice lines are
// independent note sequences with their own rhythms. A snapshot is taken at
// every distinct note start and note end across all lines, so each change of
// any voice produces a new vertical slice. A voice that is resting (or has
// no note) at a boundary is left out of that snapshot; rules skip pairs with
// a missing voice.

use crate::line::VoiceLine;
use crate::pitch::Pitch;
use crate::voice::VoicePart;
use std::collections::BTreeMap;

/// The note one voice is sounding at a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotNote {
    pub note_id: String,
    pub pitch: Pitch,
}

/// All sounding voices at one beat.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatSnapshot {
    pub beat: f64,
    pub voices: BTreeMap<VoicePart, SnapshotNote>,
}

impl BeatSnapshot {
    pub fn pitch(&self, part: VoicePart) -> Option<Pitch> {
        self.voices.get(&part).map(|n| n.pitch)
    }

    pub fn note_id(&self, part: VoicePart) -> Option<&str> {
        self.voices.get(&part).map(|n| n.note_id.as_str())
    }
}

/// Build snapshots at every note boundary, in ascending beat order.
pub fn build_snapshots(lines: &BTreeMap<VoicePart, VoiceLine>) -> Vec<BeatSnapshot> {
    let mut beats: Vec<f64> = lines
        .values()
        .flat_map(|line| line.notes.iter())
        .flat_map(|note| [note.start_beat, note.end_beat()])
        .collect();
    beats.sort_by(|a, b| a.total_cmp(b));
    beats.dedup();

    beats
        .into_iter()
        .map(|beat| {
            let voices = lines
                .iter()
                .filter_map(|(part, line)| {
                    let note = line.note_at(beat)?;
                    let pitch = note.pitch?;
                    Some((
                        *part,
                        SnapshotNote {
                            note_id: note.id.clone(),
                            pitch,
                        },
                    ))
                })
                .collect();
            BeatSnapshot { beat, voices }
        })
        .collect()
}
