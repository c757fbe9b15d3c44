// Voice-order enforcement: keep every voice strictly above the one below it.
//
// Octave fitting places each voice independently, so two adjacent voices can
// land crossed or in unison. This pass walks adjacent pairs from the bottom
// up. While the upper voice is not above the lower one, it raises the upper
// voice an octave if that stays under its ceiling. Otherwise it lowers the
// lower voice an octave, and with it every voice beneath that would end up
// above its new neighbor. The drop only happens if each of those voices stays
// above its floor; if not, the pair is given up.
//
// After pair i is handled, every pair at or below i is in order (unless it was
// given up). Raising touches only the upper voice, and a cascading drop moves
// each affected voice by one octave, which keeps an ordered pair ordered.
// Each voice only moves one way inside a pair's loop, so the walk ends.
//
// Eight-part divisi may share a pitch between adjacent parts (unison
// doubling), so there only a true crossing counts as out of order.
//
// Absolute ranges are never breached. A pair that cannot be fixed is left in
// place and reported back, and the voicing is accepted with a warning.

use crate::config::VoiceRanges;
use crate::pitch::Pitch;
use crate::voice::VoicePart;
use std::collections::BTreeMap;

/// Reorder pitches in place. `parts` must run from the lowest voice to the
/// highest. Returns the adjacent (lower, upper) pairs still out of order.
pub fn enforce_voice_order(
    pitches: &mut BTreeMap<VoicePart, Pitch>,
    parts: &[VoicePart],
    ranges: &VoiceRanges,
    allow_unison: bool,
) -> Vec<(VoicePart, VoicePart)> {
    let out_of_order = |lo: i16, hi: i16| if allow_unison { hi < lo } else { hi <= lo };

    for i in 1..parts.len() {
        let (lower, upper) = (parts[i - 1], parts[i]);
        let upper_high = ranges.range(upper).high as i16;
        loop {
            let (Some(&lo), Some(&hi)) = (pitches.get(&lower), pitches.get(&upper)) else {
                break;
            };
            let (lo, hi) = (lo as i16, hi as i16);
            if !out_of_order(lo, hi) {
                break;
            }
            if hi + 12 <= upper_high {
                pitches.insert(upper, (hi + 12) as Pitch);
                continue;
            }
            let Some(drops) = plan_drop(pitches, &parts[..i], ranges, out_of_order) else {
                break;
            };
            for (part, pitch) in drops {
                pitches.insert(part, pitch);
            }
        }
    }

    parts
        .windows(2)
        .filter_map(|pair| {
            let lo = *pitches.get(&pair[0])? as i16;
            let hi = *pitches.get(&pair[1])? as i16;
            out_of_order(lo, hi).then_some((pair[0], pair[1]))
        })
        .collect()
}

/// Drop the last of `below` an octave, then each voice under it that would
/// sit above its new upper neighbor. `None` if any drop leaves its range.
fn plan_drop(
    pitches: &BTreeMap<VoicePart, Pitch>,
    below: &[VoicePart],
    ranges: &VoiceRanges,
    out_of_order: impl Fn(i16, i16) -> bool,
) -> Option<Vec<(VoicePart, Pitch)>> {
    let mut drops = Vec::new();
    let mut above: Option<i16> = None;
    for &part in below.iter().rev() {
        let Some(&pitch) = pitches.get(&part) else {
            break;
        };
        let pitch = pitch as i16;
        if above.is_some_and(|above| !out_of_order(pitch, above)) {
            break;
        }
        let dropped = pitch - 12;
        if dropped < ranges.range(part).low as i16 {
            return None;
        }
        drops.push((part, dropped as Pitch));
        above = Some(dropped);
    }
    Some(drops)
}

/// True when each part present sits above the part below it (or level with
/// it, when `allow_unison`).
pub fn is_ordered(pitches: &BTreeMap<VoicePart, Pitch>, parts: &[VoicePart], allow_unison: bool) -> bool {
    parts.windows(2).all(|pair| match (pitches.get(&pair[0]), pitches.get(&pair[1])) {
        (Some(lo), Some(hi)) if allow_unison => hi >= lo,
        (Some(lo), Some(hi)) => hi > lo,
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{VoiceCount, VoiceRange};

    fn satb(s: Pitch, a: Pitch, t: Pitch, b: Pitch) -> BTreeMap<VoicePart, Pitch> {
        BTreeMap::from([
            (VoicePart::Soprano, s),
            (VoicePart::Alto, a),
            (VoicePart::Tenor, t),
            (VoicePart::Bass, b),
        ])
    }

    #[test]
    fn test_already_ordered_untouched() {
        let mut pitches = satb(72, 67, 64, 48);
        let before = pitches.clone();
        let unresolved =
            enforce_voice_order(&mut pitches, VoiceCount::Four.parts_bottom_up(), &VoiceRanges::default(), false);
        assert!(unresolved.is_empty());
        assert_eq!(pitches, before);
    }

    #[test]
    fn test_tenor_below_bass_is_raised() {
        let mut pitches = satb(72, 67, 50, 55);
        let parts = VoiceCount::Four.parts_bottom_up();
        let unresolved = enforce_voice_order(&mut pitches, parts, &VoiceRanges::default(), false);
        assert!(unresolved.is_empty());
        assert_eq!(pitches[&VoicePart::Tenor], 62);
        assert!(is_ordered(&pitches, parts, false));
    }

    #[test]
    fn test_lower_voice_drops_when_upper_at_ceiling() {
        // Alto 64 cannot rise to 76 (ceiling 74), so the tenor falls to 52.
        let mut pitches = satb(79, 64, 64, 48);
        let parts = VoiceCount::Four.parts_bottom_up();
        let unresolved = enforce_voice_order(&mut pitches, parts, &VoiceRanges::default(), false);
        assert!(unresolved.is_empty());
        assert_eq!(pitches[&VoicePart::Alto], 64);
        assert_eq!(pitches[&VoicePart::Tenor], 52);
    }

    #[test]
    fn test_lowering_cascades_to_voices_below() {
        // Soprano 72 has no room above, so the alto drops back to 60 and the
        // tenor and bass follow it down.
        let mut pitches = satb(72, 60, 55, 55);
        let parts = VoiceCount::Four.parts_bottom_up();
        let unresolved = enforce_voice_order(&mut pitches, parts, &VoiceRanges::default(), false);
        assert!(unresolved.is_empty());
        assert_eq!(pitches, satb(72, 60, 55, 43));
        assert!(is_ordered(&pitches, parts, false));
    }

    #[test]
    fn test_alto_above_soprano_at_ceiling_drags_tenor_down() {
        let mut pitches = satb(70, 61, 65, 49);
        let parts = VoiceCount::Four.parts_bottom_up();
        let unresolved = enforce_voice_order(&mut pitches, parts, &VoiceRanges::default(), false);
        assert!(unresolved.is_empty());
        assert_eq!(pitches, satb(70, 61, 53, 49));
    }

    #[test]
    fn test_cascade_abandoned_when_bass_has_no_room() {
        // Same shape, but the bass floor leaves no octave to drop into.
        let mut ranges = VoiceRanges::default();
        ranges.set(VoicePart::Bass, VoiceRange::new(50, 62, 50, 62));
        let mut pitches = satb(72, 60, 55, 55);
        let unresolved = enforce_voice_order(&mut pitches, VoiceCount::Four.parts_bottom_up(), &ranges, false);
        assert_eq!(unresolved, vec![(VoicePart::Alto, VoicePart::Soprano)]);
        for (part, pitch) in &pitches {
            assert!(ranges.range(*part).contains(*pitch as i16), "{} at {}", part, pitch);
        }
    }

    #[test]
    fn test_unresolvable_pair_reported() {
        let mut ranges = VoiceRanges::default();
        ranges.set(VoicePart::Soprano, VoiceRange::new(60, 62, 60, 62));
        ranges.set(VoicePart::Alto, VoiceRange::new(60, 62, 60, 62));
        let mut pitches = satb(60, 62, 55, 48);
        let unresolved = enforce_voice_order(&mut pitches, VoiceCount::Four.parts_bottom_up(), &ranges, false);
        assert_eq!(unresolved, vec![(VoicePart::Alto, VoicePart::Soprano)]);
        // Nothing left its range.
        assert_eq!(pitches[&VoicePart::Soprano], 60);
        assert_eq!(pitches[&VoicePart::Alto], 62);
    }

    #[test]
    fn test_unison_allowed_for_divisi() {
        let mut pitches = BTreeMap::from([(VoicePart::BassII, 50), (VoicePart::BassI, 50)]);
        let parts = [VoicePart::BassII, VoicePart::BassI];
        let unresolved = enforce_voice_order(&mut pitches, &parts, &VoiceRanges::default(), true);
        assert!(unresolved.is_empty());
        assert_eq!(pitches[&VoicePart::BassI], 50);
        assert!(!is_ordered(&pitches, &parts, false));
    }
}
