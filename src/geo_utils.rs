//! Geographic utilities.

use crate::GeoPoint;

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
///
/// Inputs are not range-checked: out-of-range or non-finite coordinates
/// yield a defined but meaningless result (possibly NaN) instead of an error.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push antipodal pairs just past 1.0; NaN passes through.
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Arithmetic midpoint of two coordinates (in degree space, not geodesic).
#[inline]
pub fn midpoint(p1: &GeoPoint, p2: &GeoPoint) -> GeoPoint {
    GeoPoint::new(
        (p1.latitude + p2.latitude) / 2.0,
        (p1.longitude + p2.longitude) / 2.0,
    )
}

/// Round to a fixed number of decimal places.
///
/// Rounds the exact binary value with ties to even, so `0.125` becomes
/// `0.12` and `2.675` (stored just below) becomes `2.67`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
