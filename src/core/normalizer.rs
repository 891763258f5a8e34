use crate::core::distance::is_within_metro;
use crate::core::locality::{find_locality, normalize_region, REGION_CODE};
use crate::models::raw::value_as_f64;
use crate::models::{Listing, ListingSource, Narrative, PriceQuote, RawProviderRecord, Tag};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

/// Why a raw record did not become a listing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("region {0:?} is outside the allowed jurisdiction")]
    ForeignRegion(String),

    #[error("missing or non-numeric coordinates")]
    MissingCoordinates,

    #[error("coordinates ({lat}, {lon}) are outside the metro area")]
    OutOfBounds { lat: f64, lon: f64 },

    #[error("city {0:?} is not an allowed locality")]
    UnknownLocality(String),

    #[error("no positive rental price found")]
    NoRentalPrice,

    #[error("price {0} is above the monthly rent ceiling")]
    AboveRentCeiling(f64),

    #[error("price {0} looks like a sale price")]
    SalePrice(f64),

    #[error("listing is for sale and carries no rental price evidence")]
    SaleListing,
}

/// Price thresholds and field caps used during normalization
#[derive(Debug, Clone, Copy)]
pub struct NormalizerLimits {
    pub max_monthly_rent: f64,
    pub fallback_sale_threshold: f64,
    pub clearly_sale_price: f64,
    pub description_max_chars: usize,
}

impl Default for NormalizerLimits {
    fn default() -> Self {
        Self {
            max_monthly_rent: 15_000.0,
            fallback_sale_threshold: 20_000.0,
            clearly_sale_price: 100_000.0,
            description_max_chars: 500,
        }
    }
}

/// Where the rental price was found, strongest evidence first
#[derive(Debug, Clone, Copy, PartialEq)]
enum PriceEvidence {
    RentEstimateTag(f64),
    ExplicitRent(f64),
    Fallback(f64),
}

impl PriceEvidence {
    fn amount(self) -> f64 {
        match self {
            Self::RentEstimateTag(v) | Self::ExplicitRent(v) | Self::Fallback(v) => v,
        }
    }
}

/// Turns untrusted provider records into canonical listings
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    limits: NormalizerLimits,
}

impl RecordNormalizer {
    pub fn new(limits: NormalizerLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &NormalizerLimits {
        &self.limits
    }

    /// Normalize a record, or `None` when any check fails
    pub fn normalize(&self, record: &RawProviderRecord) -> Option<Listing> {
        match self.try_normalize(record) {
            Ok(listing) => Some(listing),
            Err(rejection) => {
                tracing::debug!(
                    id = ?record.identifier(),
                    reason = %rejection,
                    "Dropping provider record"
                );
                None
            }
        }
    }

    /// Normalize a record, reporting the first failed check
    ///
    /// Checks run in a fixed order: required fields, region, coordinates,
    /// locality, then price.
    pub fn try_normalize(&self, record: &RawProviderRecord) -> Result<Listing, Rejection> {
        let id = record.identifier().ok_or(Rejection::MissingField("id"))?;
        let address = non_blank(record.address.as_deref()).ok_or(Rejection::MissingField("address"))?;
        let city = non_blank(record.city.as_deref()).ok_or(Rejection::MissingField("city"))?;
        let region = non_blank(record.region()).ok_or(Rejection::MissingField("region"))?;

        if normalize_region(region).is_none() {
            return Err(Rejection::ForeignRegion(region.to_string()));
        }

        let lat = record.latitude_value().and_then(value_as_f64);
        let lon = record.longitude_value().and_then(value_as_f64);
        let (latitude, longitude) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(Rejection::MissingCoordinates),
        };
        if !is_within_metro(latitude, longitude) {
            return Err(Rejection::OutOfBounds { lat: latitude, lon: longitude });
        }

        let locality = find_locality(city).ok_or_else(|| Rejection::UnknownLocality(city.to_string()))?;

        let price = self.resolve_price(record)?;

        Ok(Listing {
            id,
            address: address.to_string(),
            city: locality.name.to_string(),
            state: REGION_CODE.to_string(),
            latitude,
            longitude,
            price,
            bedrooms: record.bedrooms_value().and_then(value_as_f64).and_then(to_count),
            bathrooms: record
                .bathrooms_value()
                .and_then(value_as_f64)
                .filter(|b| *b >= 0.0)
                .map(|b| b as f32),
            description: record
                .descriptions
                .as_deref()
                .and_then(|d| latest_description(d, self.limits.description_max_chars)),
            source: ListingSource::Provider,
        })
    }

    fn resolve_price(&self, record: &RawProviderRecord) -> Result<u32, Rejection> {
        let evidence = find_price_evidence(record, self.limits.fallback_sale_threshold)
            .ok_or(Rejection::NoRentalPrice)?;
        let amount = evidence.amount();

        if amount <= 0.0 {
            return Err(Rejection::NoRentalPrice);
        }
        if amount > self.limits.clearly_sale_price {
            return Err(Rejection::SalePrice(amount));
        }
        if amount > self.limits.max_monthly_rent {
            return Err(Rejection::AboveRentCeiling(amount));
        }
        // Rental evidence overrides a sale status, a bare fallback quote does not.
        if record.marked_for_sale() && matches!(evidence, PriceEvidence::Fallback(_)) {
            return Err(Rejection::SaleListing);
        }

        match amount.round() as u32 {
            0 => Err(Rejection::NoRentalPrice),
            price => Ok(price),
        }
    }
}

fn find_price_evidence(record: &RawProviderRecord, fallback_threshold: f64) -> Option<PriceEvidence> {
    let tags = record.tags.as_deref().unwrap_or_default();
    if let Some(estimate) = tags
        .iter()
        .filter(|t| is_rent_estimate_tag(t))
        .find_map(|t| t.value.as_ref().and_then(amount_from_value))
    {
        return Some(PriceEvidence::RentEstimateTag(estimate));
    }

    let quotes = record.prices.as_deref().unwrap_or_default();
    if let Some(rent) = quotes
        .iter()
        .filter(|q| q.is_rent() || (q.for_sale == Some(false) && q.available == Some(true)))
        .find_map(quote_amount)
    {
        return Some(PriceEvidence::ExplicitRent(rent));
    }

    quotes
        .iter()
        .filter(|q| !q.is_sale())
        .filter_map(quote_amount)
        .find(|amount| *amount < fallback_threshold)
        .map(PriceEvidence::Fallback)
}

fn is_rent_estimate_tag(tag: &Tag) -> bool {
    tag.name
        .as_deref()
        .map(|n| {
            let lower = n.to_ascii_lowercase();
            lower.contains("rent") && lower.contains("estimate")
        })
        .unwrap_or(false)
}

fn quote_amount(quote: &PriceQuote) -> Option<f64> {
    quote.amount.as_ref().and_then(amount_from_value)
}

/// Price from either a dollar string or a bare number
fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_leading_dollar_amount(s),
        other => value_as_f64(other),
    }
    .filter(|v| *v > 0.0)
}

/// Parse the first dollar figure out of a price string
///
/// `"$2,100 - $2,400 per month"` yields 2100. Anything after a dash or a
/// per-month suffix is ignored.
pub fn parse_leading_dollar_amount(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let head = lower
        .split(['-', '\u{2013}', '\u{2014}'])
        .next()
        .unwrap_or_default();
    let head = head.split("per month").next().unwrap_or_default();
    let head = head.split("/mo").next().unwrap_or_default();

    let start = head.find(|c: char| c.is_ascii_digit())?;
    let number: String = head[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();

    number
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|v| *v > 0.0)
}

/// Newest-dated description, truncated to `max_chars`
///
/// Ties and undated entries keep array order; undated entries rank oldest.
fn latest_description(narratives: &[Narrative], max_chars: usize) -> Option<String> {
    let mut best: Option<(Option<NaiveDateTime>, &str)> = None;

    for narrative in narratives {
        let Some(text) = non_blank(narrative.text.as_deref()) else {
            continue;
        };
        let date = narrative.date.as_deref().and_then(parse_date);

        match &best {
            Some((best_date, _)) if date <= *best_date => {}
            _ => best = Some((date, text)),
        }
    }

    best.map(|(_, text)| truncate_chars(text, max_chars))
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}

fn to_count(value: f64) -> Option<u32> {
    (value >= 0.0).then(|| value.round() as u32)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
