// Cantor Engine
//
// Chord voicing and counterpoint analysis for a choral score editor. Given a
// chord progression, the engine chooses a concrete pitch for every voice of
// a four- or eight-part choir, and given the voice lines of a score it
// reports classical voice-leading problems (parallel and hidden fifths and
// octaves, crossing, overlap, spacing, range) with a summary score.
//
// Architecture:
// - pitch.rs: PitchClass value type, mod-12 interval helpers, note names
// - mode.rs: Keys and modes, scale degree to root pitch class
// - voice.rs: Voice parts (SATB and 8-part divisi), ranges, voice counts
// - chord.rs: ChordSpec, qualities and extensions, chord-tone classification
//   by role and priority, chord type derivation
// - shell.rs: Fixed shell-voicing tables per chord type, style, and voice count
// - octave.rs: Octave fitting of a pitch class into a voice range
// - ordering.rs: Bottom-up voice-order enforcement within ranges
// - voicing.rs: The voicing pipeline (Voicer), progression threading, and a
//   caller-owned voicing cache
// - line.rs: Melodic notes and voice lines, block chords to voice lines
// - snapshot.rs: Vertical beat snapshots at every note boundary
// - violation.rs: Violation kinds, severities, and records
// - rules.rs: The individual rule detectors
// - analysis.rs: Analyzer, sorted results, summary scoring, note lookups
// - config.rs: Voicing and analysis configuration, range overrides
// - error.rs: Configuration, voicing, and analysis errors
// - progression.rs: JSON progression files for the CLI
// - midi.rs: MIDI file output of voiced progressions
//
// The engine is pure and deterministic: no global state, no I/O outside
// progression loading and MIDI writing. A progression must be voiced in
// chord order because each chord's octave choices lean on the previous one.

pub mod analysis;
pub mod chord;
pub mod config;
pub mod error;
pub mod line;
pub mod midi;
pub mod mode;
pub mod octave;
pub mod ordering;
pub mod pitch;
pub mod progression;
pub mod rules;
pub mod shell;
pub mod snapshot;
pub mod violation;
pub mod voice;
pub mod voicing;
