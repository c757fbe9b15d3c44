// MIDI output for voiced progressions and voice lines.
//
// Writes a Standard MIDI File (SMF Format 1): a tempo track followed by one
// track per voice part, top voice first, each on its own channel with the
// choir-aahs program. One beat is one quarter note. Rests are gaps between
// note-off and the next note-on.
//
// Uses the `midly` crate for MIDI writing.

use crate::line::{VoiceLine, voice_lines_from_voicings};
use crate::voice::VoicePart;
use crate::voicing::Voicing;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::collections::BTreeMap;
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// General MIDI "Choir Aahs".
const CHOIR_PROGRAM: u8 = 52;

const VELOCITY: u8 = 80;

/// Voice a progression's block chords out to a MIDI file.
pub fn write_midi(
    voicings: &[Voicing],
    beats_per_chord: f64,
    tempo_bpm: u16,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let lines = voice_lines_from_voicings(voicings, beats_per_chord);
    write_lines_midi(&lines, tempo_bpm, path)
}

/// Write arbitrary voice lines to a MIDI file.
pub fn write_lines_midi(
    lines: &BTreeMap<VoicePart, VoiceLine>,
    tempo_bpm: u16,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let smf = lines_to_smf(lines, tempo_bpm);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

fn beat_to_tick(beat: f64) -> u32 {
    (beat * TICKS_PER_QUARTER as f64).round().max(0.0) as u32
}

/// Channel for the n-th track, skipping the GM percussion channel.
fn channel_for(index: usize) -> u4 {
    let ch = if index >= 9 { index + 1 } else { index };
    u4::new((ch % 16) as u8)
}

/// Convert voice lines to an in-memory SMF.
fn lines_to_smf(lines: &BTreeMap<VoicePart, VoiceLine>, tempo_bpm: u16) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / tempo_bpm.max(1) as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    for (index, (part, line)) in lines.iter().enumerate() {
        let channel = channel_for(index);
        let mut track: Track<'static> = Vec::new();

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(part.label().as_bytes())),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(CHOIR_PROGRAM),
                },
            },
        });

        let mut notes: Vec<(u32, u32, u8)> = line
            .notes
            .iter()
            .filter_map(|n| {
                let pitch = n.pitch?;
                Some((beat_to_tick(n.start_beat), beat_to_tick(n.end_beat()), pitch))
            })
            .collect();
        notes.sort_by_key(|(start, _, _)| *start);

        let mut last_tick: u32 = 0;
        for (start, end, pitch) in notes {
            let key = u7::new(pitch.min(127));
            track.push(TrackEvent {
                delta: u28::new(start.saturating_sub(last_tick)),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            last_tick = last_tick.max(start);
            track.push(TrackEvent {
                delta: u28::new(end.saturating_sub(last_tick)),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff { key, vel: u7::new(0) },
                },
            });
            last_tick = last_tick.max(end);
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_chords() -> Vec<Voicing> {
        vec![
            Voicing {
                pitches: BTreeMap::from([
                    (VoicePart::Soprano, 72),
                    (VoicePart::Alto, 67),
                    (VoicePart::Tenor, 64),
                    (VoicePart::Bass, 48),
                ]),
                unresolved: Vec::new(),
            },
            Voicing {
                pitches: BTreeMap::from([
                    (VoicePart::Soprano, 71),
                    (VoicePart::Alto, 67),
                    (VoicePart::Tenor, 62),
                    (VoicePart::Bass, 43),
                ]),
                unresolved: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_one_track_per_part() {
        let lines = voice_lines_from_voicings(&two_chords(), 2.0);
        let smf = lines_to_smf(&lines, 72);
        // 1 tempo track + 4 voice tracks
        assert_eq!(smf.tracks.len(), 5);
        // name, program, 2x (on, off), end
        assert_eq!(smf.tracks[1].len(), 7);
    }

    #[test]
    fn test_note_timing_in_ticks() {
        let lines = voice_lines_from_voicings(&two_chords(), 2.0);
        let smf = lines_to_smf(&lines, 72);
        let deltas: Vec<u32> = smf.tracks[1].iter().map(|e| e.delta.as_int()).collect();
        // on at 0, off at 960, on at 960, off at 1920
        assert_eq!(deltas, vec![0, 0, 0, 960, 0, 960, 0]);
    }

    #[test]
    fn test_channels_skip_percussion() {
        assert_eq!(channel_for(0).as_int(), 0);
        assert_eq!(channel_for(8).as_int(), 8);
        assert_eq!(channel_for(9).as_int(), 10);
    }
}
