// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod locality;
pub mod normalizer;
pub mod ranker;
pub mod scoring;

pub use distance::{haversine_distance, haversine_miles, is_within_bounding_box, is_within_metro, METRO_BOUNDING_BOX};
pub use filters::{apply_locality_adjustment, classify_listing_locality, is_roommate_candidate, LocalityTier};
pub use locality::{find_locality, normalize_locality_key, normalize_region, Locality, LOCALITIES, REGION_CODE};
pub use normalizer::{NormalizerLimits, RecordNormalizer, Rejection};
pub use ranker::{RankedMatches, Ranker};
pub use scoring::{score_listing, score_profiles, Compatibility, CompatibilityScore, IncompatibleReason, ListingScore};
