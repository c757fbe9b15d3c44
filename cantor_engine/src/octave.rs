// Octave fitting: placing a pitch class at a concrete pitch for one voice.
//
// Candidates are the target pitch class in octaves -3..=+3 around a
// reference octave taken from the middle of the voice's range. Candidates
// outside the absolute range are discarded; the rest are scored:
//
//   +20                      inside the comfortable range
//   -0.5 * |cand - previous| voice-leading distance, when a previous pitch exists
//   -0.1 * |cand - midpoint| mild pull toward the centre of the range
//
// The highest score wins; ties go to the smallest octave shift. When no
// candidate fits (a range narrower than an octave that misses the pitch
// class), the reference candidate is walked by octaves toward the range and
// then clamped, so the result is always inside [low, high].

use crate::pitch::{Pitch, PitchClass};
use crate::voice::VoiceRange;

const OCTAVE_SHIFTS: std::ops::RangeInclusive<i16> = -3..=3;

const COMFORT_BONUS: f64 = 20.0;
const MOTION_WEIGHT: f64 = 0.5;
const CENTER_WEIGHT: f64 = 0.1;

/// Choose an absolute pitch for `target` inside `range`.
pub fn fit_octave(target: PitchClass, range: &VoiceRange, previous: Option<Pitch>) -> Pitch {
    let reference = reference_pitch(target, range);
    let midpoint = range.midpoint();

    let mut best: Option<(f64, i16, i16)> = None; // (score, |shift|, pitch)
    for shift in OCTAVE_SHIFTS {
        let candidate = reference + shift * 12;
        if !range.contains(candidate) {
            continue;
        }

        let mut score = 0.0;
        if range.is_comfortable(candidate) {
            score += COMFORT_BONUS;
        }
        if let Some(prev) = previous {
            score -= MOTION_WEIGHT * (candidate - prev as i16).abs() as f64;
        }
        score -= CENTER_WEIGHT * (candidate as f64 - midpoint).abs();

        let better = match best {
            None => true,
            Some((best_score, best_shift, _)) => {
                score > best_score || (score == best_score && shift.abs() < best_shift)
            }
        };
        if better {
            best = Some((score, shift.abs(), candidate));
        }
    }

    match best {
        Some((_, _, pitch)) => pitch as Pitch,
        None => force_fit(reference, range),
    }
}

/// Target pitch class in the octave holding the range midpoint.
fn reference_pitch(target: PitchClass, range: &VoiceRange) -> i16 {
    let mid = (range.low as i16 + range.high as i16) / 2;
    (mid / 12) * 12 + target.value() as i16
}

fn force_fit(mut pitch: i16, range: &VoiceRange) -> Pitch {
    while pitch < range.low as i16 {
        pitch += 12;
    }
    while pitch > range.high as i16 && pitch - 12 >= range.low as i16 {
        pitch -= 12;
    }
    pitch.clamp(range.low as i16, range.high as i16) as Pitch
}
