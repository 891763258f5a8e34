use crate::core::distance::haversine_miles;
use crate::core::locality::{find_locality, normalize_locality_key};
use crate::models::{
    GuestFrequency, Listing, PetPreference, Profile, Role, RoommateType, ScoringWeights,
    SleepSchedule, SmokingFrequency,
};

/// Score assigned to a comparison when either side lacks the data
pub const NEUTRAL: f64 = 0.5;

/// Distance at which the locality score has decayed to 1/e
pub const DISTANCE_DECAY_MILES: f64 = 10.0;

/// Listings at or beyond this distance get a zero distance score
pub const MAX_DISTANCE_MILES: f64 = 30.0;

const AGE_TOLERANCE_YEARS: f64 = 3.0;
const AGE_DECAY_PER_YEAR: f64 = 0.1;
const ROOMMATE_COUNT_DECAY: f64 = 0.2;
const MAX_ROOMMATE_COUNT: u8 = 6;
const AFFINITY_MATCH: f64 = 0.7;
const GUEST_EXTREME_MISMATCH: f64 = 0.2;
const SMOKING_EXTREME_MISMATCH: f64 = 0.1;
const BELOW_BUDGET_FLOOR: f64 = 0.3;

/// Outcome of a profile-to-profile comparison
///
/// `Incompatible` is a hard-filter result and must not be read as a low
/// score.
#[derive(Debug, Clone, PartialEq)]
pub enum Compatibility {
    Scored(CompatibilityScore),
    Incompatible(IncompatibleReason),
}

impl Compatibility {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored(s) => Some(s.total),
            Self::Incompatible(_) => None,
        }
    }

    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Scored(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncompatibleReason {
    LocalityMismatch { subject: String, candidate: String },
}

/// Weighted blend of the three profile groups plus its rationale
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityScore {
    pub total: f64,
    pub housing: f64,
    pub demographics: f64,
    pub lifestyle: f64,
    pub reasons: Vec<String>,
}

/// Profile-to-listing score
#[derive(Debug, Clone, PartialEq)]
pub struct ListingScore {
    pub total: f64,
    pub distance_score: f64,
    pub price_score: f64,
    pub distance_miles: Option<f64>,
    pub reasons: Vec<String>,
}

/// Score two profiles against each other (0-1)
///
/// Scoring formula:
/// total = housing * 0.50 + demographics * 0.20 + lifestyle * 0.30
///
/// Each group is the plain mean of its components. A component whose inputs
/// are missing on either side contributes `NEUTRAL`.
pub fn score_profiles(
    subject: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> Compatibility {
    if let (Some(a), Some(b)) = (subject.declared_locality(), candidate.declared_locality()) {
        let (key_a, key_b) = (normalize_locality_key(a), normalize_locality_key(b));
        if key_a != key_b {
            return Compatibility::Incompatible(IncompatibleReason::LocalityMismatch {
                subject: key_a,
                candidate: key_b,
            });
        }
    }

    let mut reasons = Vec::new();

    // Housing core
    let budget = budget_overlap_score(subject.budget(), candidate.budget());
    let space = space_type_score(&subject.space_types, &candidate.space_types);
    let roommate_type = roommate_type_score(subject.roommate_type, candidate.roommate_type);
    let count = roommate_count_score(
        subject.desired_roommates.as_deref(),
        candidate.desired_roommates.as_deref(),
    );

    if subject.budget().is_some() && candidate.budget().is_some() {
        if budget > 0.0 {
            reasons.push(format!("Budgets overlap by {:.0}%", budget * 100.0));
        } else {
            reasons.push("Budgets don't overlap".to_string());
        }
    }
    if space == 1.0 {
        reasons.push("Looking for the same kind of space".to_string());
    }
    if roommate_type == 1.0 {
        reasons.push("Compatible roommate type".to_string());
    }
    if count == 1.0 {
        reasons.push("Wants the same number of roommates".to_string());
    }
    if subject.role == Role::Seeker && candidate.role == Role::Host {
        reasons.push("Has a place to share".to_string());
    }

    // Demographics
    let age = age_score(subject.age, candidate.age);
    let affinity = affinity_score(subject.school.as_deref(), candidate.school.as_deref());

    if age == 1.0 && subject.age.is_some() && candidate.age.is_some() {
        reasons.push("Close in age".to_string());
    }
    if affinity == AFFINITY_MATCH {
        if let Some(school) = candidate.school.as_deref() {
            reasons.push(format!("Also at {}", school.trim()));
        }
    }

    // Lifestyle
    let cleanliness = scale_score(subject.cleanliness, candidate.cleanliness);
    let sociability = scale_score(subject.sociability, candidate.sociability);
    let sleep = sleep_schedule_score(subject.sleep_schedule, candidate.sleep_schedule);
    let guests = guest_score(subject.guests, candidate.guests);
    let smoking = smoking_score(subject.smoking, candidate.smoking);
    let pets = pet_score(subject.pets, candidate.pets);

    if subject.cleanliness.is_some() && candidate.cleanliness.is_some() {
        if cleanliness >= 0.8 {
            reasons.push("Similar cleanliness standards".to_string());
        } else if cleanliness <= 0.3 {
            reasons.push("Very different cleanliness standards".to_string());
        }
    }
    if subject.sociability.is_some() && candidate.sociability.is_some() && sociability >= 0.8 {
        reasons.push("Similar social energy".to_string());
    }
    match (subject.sleep_schedule, candidate.sleep_schedule, sleep) {
        (Some(_), Some(_), s) if s == 1.0 => reasons.push("Compatible sleep schedules".to_string()),
        (Some(_), Some(_), s) if s == 0.0 => reasons.push("Opposite sleep schedules".to_string()),
        _ => {}
    }
    if guests == GUEST_EXTREME_MISMATCH {
        reasons.push("Very different expectations about guests".to_string());
    }
    if smoking == 1.0 {
        reasons.push("Same smoking habits".to_string());
    } else if smoking == SMOKING_EXTREME_MISMATCH {
        reasons.push("Smoking habits conflict".to_string());
    }
    if pets == 1.0 {
        reasons.push("Agree on pets".to_string());
    } else if pets == 0.0 {
        reasons.push("Disagree on pets".to_string());
    }

    let housing = mean(&[budget, space, roommate_type, count]);
    let demographics = mean(&[age, affinity]);
    let lifestyle = mean(&[cleanliness, sociability, sleep, guests, smoking, pets]);

    let total = (housing * weights.housing
        + demographics * weights.demographics
        + lifestyle * weights.lifestyle)
        .clamp(0.0, 1.0);

    Compatibility::Scored(CompatibilityScore {
        total,
        housing,
        demographics,
        lifestyle,
        reasons,
    })
}

/// Score a listing for a subject (0-1)
///
/// Scoring formula:
/// total = distance_score * 0.60 + price_score * 0.40
///
/// Locality filtering is left to the ranker.
pub fn score_listing(
    subject: &Profile,
    listing: &Listing,
    weights: &ScoringWeights,
) -> ListingScore {
    let mut reasons = Vec::new();

    let (distance_score, distance_miles) = match reference_point(subject, listing) {
        Some((lat, lon, label)) => {
            let miles = haversine_miles(lat, lon, listing.latitude, listing.longitude);
            reasons.push(format!("{:.1} mi from {}", miles, label));
            (locality_distance_score(miles), Some(miles))
        }
        None => (NEUTRAL, None),
    };

    let budget = subject.budget();
    let price_score = price_proximity_score(listing.price, budget);
    if let Some((min, max)) = budget.map(ordered) {
        if listing.price < min {
            reasons.push(format!("${} under budget", min - listing.price));
        } else if listing.price > max {
            reasons.push(format!("${} over budget", listing.price - max));
        } else {
            reasons.push("Within budget".to_string());
        }
    }

    let total = (distance_score * weights.listing_distance + price_score * weights.listing_price)
        .clamp(0.0, 1.0);

    ListingScore {
        total,
        distance_score,
        price_score,
        distance_miles,
        reasons,
    }
}

/// Pick the point a listing's distance is measured from
///
/// A listing in a different recognized locality is measured from its own
/// locality center, so nearby towns are not punished for being far from the
/// subject's preferred center.
fn reference_point(subject: &Profile, listing: &Listing) -> Option<(f64, f64, String)> {
    let subject_locality = subject.declared_locality().and_then(find_locality);
    let listing_locality = find_locality(&listing.city);

    match (subject_locality, listing_locality) {
        (Some(own), Some(other)) if own.name != other.name => {
            Some((other.latitude, other.longitude, format!("{} center", other.name)))
        }
        (None, Some(other)) if subject.coordinate().is_none() => {
            Some((other.latitude, other.longitude, format!("{} center", other.name)))
        }
        (Some(own), _) => Some((own.latitude, own.longitude, format!("{} center", own.name))),
        _ => subject
            .coordinate()
            .map(|(lat, lon)| (lat, lon, "your location".to_string())),
    }
}

/// Budget overlap as intersection over union of the two ranges
pub fn budget_overlap_score(a: Option<(u32, u32)>, b: Option<(u32, u32)>) -> f64 {
    let (Some((min_a, max_a)), Some((min_b, max_b))) = (a, b) else {
        return NEUTRAL;
    };
    if min_a >= max_a || min_b >= max_b {
        return NEUTRAL;
    }

    let overlap = max_a.min(max_b).saturating_sub(min_a.max(min_b)) as f64;
    let union = (max_a.max(max_b) - min_a.min(min_b)) as f64;

    overlap / union
}

/// 1 when the declared space types intersect, 0 when both are declared and
/// disjoint
pub fn space_type_score(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return NEUTRAL;
    }
    let overlaps = a
        .iter()
        .any(|x| b.iter().any(|y| x.trim().eq_ignore_ascii_case(y.trim())));
    if overlaps { 1.0 } else { 0.0 }
}

pub fn roommate_type_score(a: Option<RoommateType>, b: Option<RoommateType>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b || a == RoommateType::Either || b == RoommateType::Either => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => NEUTRAL,
    }
}

/// Parse a desired roommate count ("none" is 0, "6+" is 6)
pub fn normalize_roommate_count(text: &str) -> Option<u8> {
    let text = text.trim().to_ascii_lowercase();
    if text == "none" {
        return Some(0);
    }
    text.trim_end_matches('+')
        .trim()
        .parse::<u8>()
        .ok()
        .map(|n| n.min(MAX_ROOMMATE_COUNT))
}

pub fn roommate_count_score(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a.and_then(normalize_roommate_count), b.and_then(normalize_roommate_count)) {
        (Some(a), Some(b)) => {
            let diff = (a as f64 - b as f64).abs();
            (1.0 - ROOMMATE_COUNT_DECAY * diff).max(0.0)
        }
        _ => NEUTRAL,
    }
}

/// Full score within three years, then 0.1 off per extra year
pub fn age_score(a: Option<u8>, b: Option<u8>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return NEUTRAL;
    };
    let gap = (a as f64 - b as f64).abs();
    if gap <= AGE_TOLERANCE_YEARS {
        return 1.0;
    }
    (1.0 - (gap - AGE_TOLERANCE_YEARS) * AGE_DECAY_PER_YEAR).max(0.0)
}

/// Small boost for a shared school, never a penalty
pub fn affinity_score(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a.map(str::trim), b.map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() && a.eq_ignore_ascii_case(b) => AFFINITY_MATCH,
        _ => NEUTRAL,
    }
}

/// Distance on a 1-10 scale mapped to 0-1
pub fn scale_score(a: Option<u8>, b: Option<u8>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => (1.0 - (a as f64 - b as f64).abs() / 9.0).max(0.0),
        _ => NEUTRAL,
    }
}

pub fn sleep_schedule_score(a: Option<SleepSchedule>, b: Option<SleepSchedule>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b || a == SleepSchedule::Both || b == SleepSchedule::Both => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => NEUTRAL,
    }
}

pub fn guest_score(a: Option<GuestFrequency>, b: Option<GuestFrequency>) -> f64 {
    use GuestFrequency::{Always, Never};
    match (a, b) {
        (Some(Never), Some(Always)) | (Some(Always), Some(Never)) => GUEST_EXTREME_MISMATCH,
        (Some(_), Some(_)) => 1.0,
        _ => NEUTRAL,
    }
}

pub fn smoking_score(a: Option<SmokingFrequency>, b: Option<SmokingFrequency>) -> f64 {
    use SmokingFrequency::{Never, Often};
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(Never), Some(Often)) | (Some(Often), Some(Never)) => SMOKING_EXTREME_MISMATCH,
        _ => NEUTRAL,
    }
}

pub fn pet_score(a: Option<PetPreference>, b: Option<PetPreference>) -> f64 {
    use PetPreference::{No, Yes};
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(Yes), Some(No)) | (Some(No), Some(Yes)) => 0.0,
        _ => NEUTRAL,
    }
}

/// Exponential decay from a locality center, zero past the cutoff
pub fn locality_distance_score(miles: f64) -> f64 {
    if miles >= MAX_DISTANCE_MILES {
        return 0.0;
    }
    (-miles / DISTANCE_DECAY_MILES).exp()
}

/// How well a monthly price fits a budget range
///
/// Inside the range scores 1. Below the minimum decays slowly with a floor of
/// 0.3; above the maximum decays twice as fast down to 0.
pub fn price_proximity_score(price: u32, budget: Option<(u32, u32)>) -> f64 {
    let Some((min, max)) = budget.map(ordered) else {
        return NEUTRAL;
    };
    let width = if max > min { (max - min) as f64 } else { max.max(1) as f64 };

    if price < min {
        let shortfall = (min - price) as f64;
        (1.0 - shortfall / width).max(BELOW_BUDGET_FLOOR)
    } else if price > max {
        let excess = (price - max) as f64;
        (1.0 - 2.0 * excess / width).max(0.0)
    } else {
        1.0
    }
}

fn ordered((a, b): (u32, u32)) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return NEUTRAL;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
