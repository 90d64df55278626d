//! # Route Snap
//!
//! Speed-camera snapping for a fixed set of highway routes.
//!
//! This library provides:
//! - Great-circle (haversine) distance between coordinates
//! - Snapping of points of interest onto forward/reverse route polylines
//! - Route-km placement of snapped points along a polyline
//! - Per-route snapshots and a summary index for downstream consumers
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel classification with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use routesnap::{classify_points, GeoPoint, Polyline, PointOfInterest, SnapConfig};
//!
//! let forward = Polyline::from_points(vec![
//!     GeoPoint::new(25.0, 55.0),
//!     GeoPoint::new(25.0, 55.1),
//!     GeoPoint::new(25.0, 55.2),
//! ]);
//! let reverse = forward.reversed();
//!
//! let cameras = vec![PointOfInterest::new(25.0005, 55.1)];
//! let result = classify_points(&cameras, &forward, &reverse, &SnapConfig::default());
//!
//! assert_eq!(result.on_route.len(), 1);
//! assert!(result.off_route.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RouteSnapError, Service};

// Geographic utilities (haversine distance, midpoints)
pub mod geo_utils;

// Route polylines
pub mod polyline;
pub use polyline::Polyline;

// Snapping, route-km and classification
pub mod matching;
#[cfg(feature = "parallel")]
pub use matching::classify_points_parallel;
pub use matching::{classify_point, classify_points, route_km, snap_to_polyline};

// Route catalog with bounding-box lookup
pub mod route;
pub use route::{builtin_routes, BoundingBox, Endpoint, RouteCatalog, RouteConfig};

// External collaborators (point-data and routing services)
pub mod sources;
pub use sources::{DirectorySource, RouteDataSource, RouteGeometry};

// Per-route snapshots
pub mod snapshot;
pub use snapshot::{collect_route, RouteSnapshot};

// Routes index
pub mod index;
pub use index::{RouteIndexEntry, RoutesIndex, RoutesSummary};

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate in degrees.
///
/// Serialized as `{"lat": .., "lon": ..}` to match the route data files.
///
/// # Example
/// ```
/// use routesnap::GeoPoint;
/// let point = GeoPoint::new(25.2048, 55.2708); // Dubai
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a point from a GeoJSON-ordered `[lon, lat]` pair.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }

    /// The point as a `[lat, lon]` pair.
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    /// Check if the point has finite, in-range coordinates.
    ///
    /// The distance math never calls this; it is here for callers that
    /// want strict input validation before snapping.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A point of interest (e.g. a speed camera) with pass-through attributes.
///
/// Attributes such as `speed_limit` or `source` are carried unmodified
/// into the classified output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(flatten)]
    pub location: GeoPoint,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PointOfInterest {
    /// Create a point of interest without attributes.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: GeoPoint::new(latitude, longitude),
            attributes: Map::new(),
        }
    }

    /// Attach an attribute, replacing any previous value under the same key.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Outcome of snapping one point against one polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Minimum three-sample distance to the polyline in meters
    pub distance_m: f64,
    /// Index of the closest segment (0..N-2)
    pub segment_index: usize,
    /// Nearer endpoint of the closest segment
    pub snapped: GeoPoint,
}

/// Which polyline of a route pair a point was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelDirection {
    /// Start → end (the "ab" polyline)
    Forward,
    /// End → start (the "ba" polyline)
    Reverse,
}

impl std::fmt::Display for TravelDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelDirection::Forward => write!(f, "forward"),
            TravelDirection::Reverse => write!(f, "reverse"),
        }
    }
}

/// Direction label attached to on-route cameras.
///
/// Classification always emits [`CameraDirection::Both`]; consumers read
/// the `direction` field expecting that label. The polyline that actually
/// produced the match is recorded separately in [`ClassifiedPoint::matched`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraDirection {
    #[default]
    Both,
}

/// A point of interest that snapped onto the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPoint {
    #[serde(flatten)]
    pub point: PointOfInterest,
    pub snap_lat: f64,
    pub snap_lon: f64,
    /// Distance along the matched polyline to the start of the closest
    /// segment, in km rounded to two decimals
    pub route_km: f64,
    /// Closest segment index on the matched polyline
    pub route_idx: usize,
    /// Snap distance in whole meters (truncated)
    pub snap_m: u64,
    pub direction: CameraDirection,
    pub matched: TravelDirection,
}

impl ClassifiedPoint {
    /// The snapped coordinate.
    pub fn snapped(&self) -> GeoPoint {
        GeoPoint::new(self.snap_lat, self.snap_lon)
    }
}

/// A point of interest farther than the threshold from both polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffRoutePoint {
    #[serde(flatten)]
    pub point: PointOfInterest,
    /// Measured distance in whole meters (truncated).
    /// `None` when neither polyline had a segment to measure against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_m: Option<u64>,
}

/// Result of classifying a batch of points against a route pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub on_route: Vec<ClassifiedPoint>,
    pub off_route: Vec<OffRoutePoint>,
}

/// Configuration for snapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Maximum snap distance in meters; a point at exactly this distance
    /// is still on-route.
    /// Default: 750.0 meters
    pub threshold_m: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { threshold_m: 750.0 }
    }
}
