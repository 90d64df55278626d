//! Route polylines.
//!
//! Routing services hand out GeoJSON `[lon, lat]` pairs. They are converted
//! to [`GeoPoint`]s once, on construction, so all distance math downstream
//! works in (lat, lon).

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::GeoPoint;

/// Ordered sequence of coordinates for one direction of travel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Create a polyline from points already in (lat, lon) form.
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Create a polyline from GeoJSON-ordered `[lon, lat]` pairs.
    pub fn from_lon_lat(coords: &[[f64; 2]]) -> Self {
        Self {
            points: coords.iter().copied().map(GeoPoint::from_lon_lat).collect(),
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of segments (consecutive point pairs). Zero for fewer than two points.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Total geodesic length in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| haversine_distance(&w[0], &w[1]))
            .sum()
    }

    /// The same path travelled end to start.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Points as `[lat, lon]` pairs, the layout used in route data files.
    pub fn to_lat_lon_pairs(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lat_lon()).collect()
    }
}

impl From<Vec<GeoPoint>> for Polyline {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::from_points(points)
    }
}
