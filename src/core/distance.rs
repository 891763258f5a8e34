use crate::models::BoundingBox;
use geo::{point, HaversineDistance};

const KM_PER_MILE: f64 = 1.609_344;

/// Bounding box approximating metropolitan Boston
///
/// Normalized listings must fall inside it (edges inclusive).
pub const METRO_BOUNDING_BOX: BoundingBox = BoundingBox {
    min_lat: 42.22,
    max_lat: 42.45,
    min_lon: -71.20,
    max_lon: -70.98,
};

/// Calculate the great-circle distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = point!(x: lon1, y: lat1);
    let to = point!(x: lon2, y: lat2);

    from.haversine_distance(&to) / 1000.0
}

/// Great-circle distance in miles
#[inline]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(lat1, lon1, lat2, lon2) / KM_PER_MILE
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}

/// Check a coordinate against the metro bounding box
#[inline]
pub fn is_within_metro(lat: f64, lon: f64) -> bool {
    is_within_bounding_box(lat, lon, &METRO_BOUNDING_BOX)
}
