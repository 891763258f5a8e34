use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Listing, Profile};

/// Request to rank roommate candidates for a subject
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoommateMatchRequest {
    #[validate(nested)]
    pub subject: Profile,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub candidates: Vec<Profile>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: Option<f64>,
}

/// Request to rank listings for a subject
///
/// `listings` carries user-authored listings supplied by the caller. When
/// `includeIngested` is set the provider listings from an ingestion cycle
/// are ranked alongside them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingMatchRequest {
    #[validate(nested)]
    pub subject: Profile,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(alias = "include_ingested", rename = "includeIngested", default = "default_true")]
    pub include_ingested: bool,
    #[validate(length(max = 100))]
    pub filter: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: Option<f64>,
}

/// Request to run an ingestion cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RefreshListingsRequest {
    #[validate(length(max = 100))]
    pub filter: Option<String>,
}

fn default_true() -> bool {
    true
}
