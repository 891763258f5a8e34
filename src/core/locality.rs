//! Locality allow-list, locality centers and region synonyms.

/// The only jurisdiction listings may belong to
pub const REGION_CODE: &str = "MA";

const REGION_SYNONYMS: &[&str] = &["ma", "mass", "mass.", "massachusetts"];

/// Allow-listed locality with its reference center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locality {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Recognized localities. The first entry is the primary ingestion locality.
pub const LOCALITIES: &[Locality] = &[
    Locality { name: "Boston", latitude: 42.3601, longitude: -71.0589 },
    Locality { name: "Cambridge", latitude: 42.3736, longitude: -71.1097 },
    Locality { name: "Somerville", latitude: 42.3876, longitude: -71.0995 },
    Locality { name: "Brookline", latitude: 42.3318, longitude: -71.1212 },
    Locality { name: "Medford", latitude: 42.4184, longitude: -71.1062 },
];

/// Map a region string to the canonical code, if it is a known synonym
pub fn normalize_region(region: &str) -> Option<&'static str> {
    let lower = region.trim().to_ascii_lowercase();
    REGION_SYNONYMS
        .contains(&lower.as_str())
        .then_some(REGION_CODE)
}

/// Find the allow-listed locality named by `text`
///
/// Matching is case-insensitive on whole words, so "East Boston" and
/// "Cambridge, MA" both resolve while fragments like "ston" do not.
pub fn find_locality(text: &str) -> Option<&'static Locality> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }

    LOCALITIES.iter().find(|l| {
        let name = l.name.to_lowercase();
        let parts: Vec<&str> = name.split_whitespace().collect();
        words.windows(parts.len()).any(|window| window == parts.as_slice())
    })
}

/// Comparable key for a locality name
///
/// Recognized localities map to their canonical name; anything else is
/// lowercased with whitespace collapsed.
pub fn normalize_locality_key(text: &str) -> String {
    match find_locality(text) {
        Some(locality) => locality.name.to_string(),
        None => collapse_whitespace(&text.to_lowercase()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
