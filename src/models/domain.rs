use serde::{Deserialize, Serialize};
use validator::Validate;

/// Canonical rental listing
///
/// Provider records only become a `Listing` after passing the normalizer,
/// so coordinates are always inside the metro box and the price is a
/// positive monthly rent under the configured ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: u32,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: ListingSource,
}

/// Where a listing came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Provider,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seeker,
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoommateType {
    Student,
    Professional,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmokingFrequency {
    Never,
    #[serde(alias = "occasionally")]
    Sometimes,
    Often,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetPreference {
    Yes,
    No,
    Depends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepSchedule {
    Early,
    Late,
    #[serde(alias = "flexible")]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestFrequency {
    Never,
    Sometimes,
    Always,
}

/// Free-form profile prompt and the user's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptAnswer {
    pub question: String,
    pub answer: String,
}

/// User profile used as both the matching subject and a candidate
///
/// Every attribute except the id and role is optional. The scorer treats a
/// missing attribute as neutral instead of rejecting the profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[validate(length(min = 1))]
    pub id: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub seeking_roommate: bool,
    #[serde(default)]
    pub budget_min: Option<u32>,
    #[serde(default)]
    pub budget_max: Option<u32>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub space_types: Vec<String>,
    #[serde(default)]
    pub roommate_type: Option<RoommateType>,
    #[serde(default)]
    pub desired_roommates: Option<String>,
    #[serde(default)]
    pub smoking: Option<SmokingFrequency>,
    #[serde(default)]
    pub pets: Option<PetPreference>,
    #[serde(default)]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(default)]
    pub guests: Option<GuestFrequency>,
    #[validate(range(min = 1, max = 10))]
    #[serde(default)]
    pub cleanliness: Option<u8>,
    #[validate(range(min = 1, max = 10))]
    #[serde(default)]
    pub sociability: Option<u8>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub prompts: Vec<PromptAnswer>,
}

impl Profile {
    /// Bare profile with only the required fields set
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            seeking_roommate: true,
            budget_min: None,
            budget_max: None,
            age: None,
            school: None,
            space_types: Vec::new(),
            roommate_type: None,
            desired_roommates: None,
            smoking: None,
            pets: None,
            sleep_schedule: None,
            guests: None,
            cleanliness: None,
            sociability: None,
            locality: None,
            latitude: None,
            longitude: None,
            bio: None,
            prompts: Vec::new(),
        }
    }

    /// Declared locality, ignoring blank strings
    pub fn declared_locality(&self) -> Option<&str> {
        self.locality
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Budget range when both ends are present
    pub fn budget(&self) -> Option<(u32, u32)> {
        match (self.budget_min, self.budget_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

fn default_true() -> bool { true }

/// Ranked recommendation for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub candidate_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Scoring weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub housing: f64,
    pub demographics: f64,
    pub lifestyle: f64,
    pub listing_distance: f64,
    pub listing_price: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            housing: 0.50,
            demographics: 0.20,
            lifestyle: 0.30,
            listing_distance: 0.60,
            listing_price: 0.40,
        }
    }
}
