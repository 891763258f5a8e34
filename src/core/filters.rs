use crate::core::locality::{find_locality, normalize_locality_key};
use crate::models::{Listing, Profile};

/// Bonus for a listing in the subject's own locality
pub const SAME_LOCALITY_BONUS: f64 = 0.1;

/// Penalty for a listing in a different allow-listed locality
pub const CROSS_LOCALITY_PENALTY: f64 = 0.2;

/// The cross-locality penalty never pushes a score below this
pub const CROSS_LOCALITY_FLOOR: f64 = 0.3;

/// How a listing's locality relates to the subject's preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalityTier {
    /// Same locality as the subject
    Same,
    /// Different, but still an allow-listed locality
    Nearby,
    /// Allow-listed listing and the subject declared no locality
    Unspecified,
    /// Not an allow-listed locality at all
    Excluded,
}

/// Check if a profile can be offered as a roommate to the subject
#[inline]
pub fn is_roommate_candidate(subject: &Profile, candidate: &Profile) -> bool {
    // Never match the subject with itself
    if candidate.id == subject.id {
        return false;
    }

    candidate.seeking_roommate
}

/// Classify a listing against the subject's preferred locality
pub fn classify_listing_locality(subject: &Profile, listing: &Listing) -> LocalityTier {
    let Some(listing_locality) = find_locality(&listing.city) else {
        return LocalityTier::Excluded;
    };

    // An unrecognized declared locality still differs from every allow-listed one
    match subject.declared_locality().map(normalize_locality_key) {
        Some(preferred) if preferred == listing_locality.name => LocalityTier::Same,
        Some(_) => LocalityTier::Nearby,
        None => LocalityTier::Unspecified,
    }
}

/// Apply the locality bonus or penalty to a base listing score
///
/// Returns `None` for excluded listings. A penalized score is floored at
/// `CROSS_LOCALITY_FLOOR`, unless the base score was already below it.
pub fn apply_locality_adjustment(base: f64, tier: LocalityTier) -> Option<f64> {
    let adjusted = match tier {
        LocalityTier::Excluded => return None,
        LocalityTier::Same => base + SAME_LOCALITY_BONUS,
        LocalityTier::Nearby => {
            (base - CROSS_LOCALITY_PENALTY).max(base.min(CROSS_LOCALITY_FLOOR))
        }
        LocalityTier::Unspecified => base,
    };

    Some(adjusted.clamp(0.0, 1.0))
}
