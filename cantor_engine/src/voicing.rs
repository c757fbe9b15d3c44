// Smart voicing: chord spec in, one concrete pitch per voice out.
//
// The pipeline per chord is
//
//   resolve root → classify tones (chord.rs) → shell selection (shell.rs)
//     → octave fit per slot (octave.rs) → voice-order enforcement (ordering.rs)
//
// Each chord's octave choices depend on the previous chord's voicing (the
// fitter rewards small motion), so a progression must be voiced in order,
// threading each result into the next call. `voice_progression` does that.
// Nothing here holds state between calls; `VoicingCache` is an explicit
// memo owned by the caller.

use crate::chord::{ChordSpec, ChordType, Extensions, Quality, classify_chord_tones};
use crate::config::VoicingConfig;
use crate::error::{ConfigError, VoicingError};
use crate::octave::fit_octave;
use crate::ordering::enforce_voice_order;
use crate::pitch::{Pitch, PitchClass, pitch_name};
use crate::shell::select_shell_voicing;
use crate::voice::VoicePart;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Concrete pitches for every voice at one chord instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voicing {
    pub pitches: BTreeMap<VoicePart, Pitch>,
    /// Adjacent (lower, upper) pairs the ranges would not let us order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<(VoicePart, VoicePart)>,
}

impl Voicing {
    pub fn pitch(&self, part: VoicePart) -> Option<Pitch> {
        self.pitches.get(&part).copied()
    }

    /// Pitches as note names, for display.
    pub fn named(&self) -> BTreeMap<VoicePart, String> {
        self.pitches
            .iter()
            .map(|(part, pitch)| (*part, pitch_name(*pitch)))
            .collect()
    }

    pub fn is_fully_ordered(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Voices chords under one validated configuration.
#[derive(Debug, Clone)]
pub struct Voicer {
    config: VoicingConfig,
}

impl Voicer {
    pub fn new(config: VoicingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Voicer { config })
    }

    pub fn config(&self) -> &VoicingConfig {
        &self.config
    }

    /// Voice one chord, optionally leading from the previous chord's voicing.
    pub fn voice_chord(&self, chord: &ChordSpec, previous: Option<&Voicing>) -> Result<Voicing, VoicingError> {
        let root = chord.resolve_root()?;
        Ok(self.voice_resolved(root, chord.quality, &chord.extensions, previous))
    }

    fn voice_resolved(
        &self,
        root: PitchClass,
        quality: Quality,
        extensions: &Extensions,
        previous: Option<&Voicing>,
    ) -> Voicing {
        let tones = classify_chord_tones(root, quality, extensions);
        let chord_type = ChordType::derive(quality, extensions);
        let parts = self.config.voice_count.parts_bottom_up();
        let selection = select_shell_voicing(&tones, chord_type, self.config.voice_count, self.config.style);

        let mut pitches = BTreeMap::new();
        for (part, pc) in parts.iter().zip(selection) {
            let range = self.config.ranges.range(*part);
            let prev = previous.and_then(|v| v.pitch(*part));
            pitches.insert(*part, fit_octave(pc, &range, prev));
        }

        let unresolved = enforce_voice_order(
            &mut pitches,
            parts,
            &self.config.ranges,
            self.config.voice_count.allows_unison(),
        );
        if !unresolved.is_empty() {
            warn!(
                root = %root,
                ?quality,
                ?unresolved,
                "voice order could not be fixed within ranges"
            );
        }
        debug!(root = %root, ?quality, ?chord_type, ?pitches, "voiced chord");

        Voicing { pitches, unresolved }
    }

    /// Voice a whole progression in order, each chord leading from the last.
    /// Stops at the first chord that cannot be voiced.
    pub fn voice_progression(
        &self,
        chords: &[ChordSpec],
        initial: Option<&Voicing>,
    ) -> Result<Vec<Voicing>, VoicingError> {
        let mut out: Vec<Voicing> = Vec::with_capacity(chords.len());
        for (index, chord) in chords.iter().enumerate() {
            let previous = out.last().or(initial);
            let voicing = self
                .voice_chord(chord, previous)
                .map_err(|e| VoicingError::Chord {
                    index,
                    source: Box::new(e),
                })?;
            out.push(voicing);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    root: PitchClass,
    quality: Quality,
    extensions: Extensions,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    previous: Option<BTreeMap<VoicePart, Pitch>>,
    voicing: Voicing,
}

/// Memo of voicings per (root, quality, extensions).
///
/// Each chord keeps only its latest result along with the previous voicing
/// it was computed against. Asking again with a different previous voicing
/// recomputes and replaces that slot, so the cache holds at most one entry
/// per distinct chord however often the surrounding chords are edited.
#[derive(Debug)]
pub struct VoicingCache {
    voicer: Voicer,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl VoicingCache {
    pub fn new(voicer: Voicer) -> Self {
        VoicingCache {
            voicer,
            entries: HashMap::new(),
        }
    }

    pub fn voice_chord(&mut self, chord: &ChordSpec, previous: Option<&Voicing>) -> Result<Voicing, VoicingError> {
        let key = CacheKey {
            root: chord.resolve_root()?,
            quality: chord.quality,
            extensions: chord.extensions,
        };
        let previous_pitches = previous.map(|v| &v.pitches);
        let fresh = self.entries.get(&key).filter(|hit| hit.previous.as_ref() == previous_pitches);
        if let Some(hit) = fresh {
            return Ok(hit.voicing.clone());
        }
        let voicing = self
            .voicer
            .voice_resolved(key.root, key.quality, &key.extensions, previous);
        self.entries.insert(
            key,
            CacheEntry {
                previous: previous_pitches.cloned(),
                voicing: voicing.clone(),
            },
        );
        Ok(voicing)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
