// Model exports
pub mod domain;
pub mod raw;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, GuestFrequency, Listing, ListingSource, MatchResult, PetPreference, Profile,
    PromptAnswer, Role, RoommateType, ScoringWeights, SleepSchedule, SmokingFrequency,
};
pub use raw::{Narrative, PriceQuote, RawProviderRecord, Tag};
pub use requests::{ListingMatchRequest, RefreshListingsRequest, RoommateMatchRequest};
pub use responses::{CacheResetResponse, ErrorResponse, HealthResponse, MatchesResponse, RefreshListingsResponse};
