use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

// record
//  ├── id / property_id
//  ├── address, city, state / state_code
//  ├── latitude / lat, longitude / lon      (number or numeric text)
//  ├── bedrooms / bedroom, bathrooms / bathroom
//  ├── prices[]        { type, amount, status, for_sale, available }
//  ├── statuses[]      "for_sale", "for_rent", ...
//  ├── tags[]          { name, value }
//  └── descriptions[]  { text, date }
//
// Providers disagree on field names and types, so anything that has been
// seen in more than one shape is kept as a raw `Value`.

/// Untrusted record as returned by the listings provider
///
/// A field of the wrong type reads as absent instead of failing the whole
/// record; the normalizer decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProviderRecord {
    pub id: Option<Value>,
    pub property_id: Option<Value>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state_code: Option<String>,

    pub latitude: Option<Value>,
    pub lat: Option<Value>,
    pub longitude: Option<Value>,
    pub lon: Option<Value>,

    pub bedrooms: Option<Value>,
    pub bedroom: Option<Value>,
    pub bathrooms: Option<Value>,
    pub bathroom: Option<Value>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub prices: Option<Vec<PriceQuote>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub statuses: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub descriptions: Option<Vec<Narrative>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceQuote {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub for_sale: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Usually a price string, sometimes a bare number
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Narrative {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_bool()))
}

// Items that do not decode are skipped; a non-array reads as absent.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

impl RawProviderRecord {
    /// Identifier as a string; numeric ids are accepted
    pub fn identifier(&self) -> Option<String> {
        self.id
            .as_ref()
            .or(self.property_id.as_ref())
            .and_then(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
    }

    pub fn region(&self) -> Option<&str> {
        self.state.as_deref().or(self.state_code.as_deref())
    }

    pub fn latitude_value(&self) -> Option<&Value> {
        self.latitude.as_ref().or(self.lat.as_ref())
    }

    pub fn longitude_value(&self) -> Option<&Value> {
        self.longitude.as_ref().or(self.lon.as_ref())
    }

    pub fn bedrooms_value(&self) -> Option<&Value> {
        self.bedrooms.as_ref().or(self.bedroom.as_ref())
    }

    pub fn bathrooms_value(&self) -> Option<&Value> {
        self.bathrooms.as_ref().or(self.bathroom.as_ref())
    }

    /// True when any status marker says the property is for sale
    pub fn marked_for_sale(&self) -> bool {
        self.statuses
            .as_ref()
            .map(|s| s.iter().any(|status| is_sale_marker(status)))
            .unwrap_or(false)
    }
}

impl PriceQuote {
    pub fn is_sale(&self) -> bool {
        self.for_sale == Some(true)
            || self.kind.as_deref().map(is_sale_marker).unwrap_or(false)
            || self.status.as_deref().map(is_sale_marker).unwrap_or(false)
    }

    pub fn is_rent(&self) -> bool {
        self.kind
            .as_deref()
            .map(|k| k.to_ascii_lowercase().contains("rent"))
            .unwrap_or(false)
    }
}

fn is_sale_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("sale") || lower == "sold"
}

/// Read a number out of a JSON number or numeric-looking string
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
