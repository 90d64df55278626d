//! Route catalog.
//!
//! Each route is a pair of named endpoints plus the bounding box used to
//! query point data. Boxes are kept in an R-tree so a camera list fetched
//! for a whole region can be split across the routes that cover it.

use std::collections::HashMap;

use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteSnapError};
use crate::{GeoPoint, PointOfInterest};

/// A named route endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Endpoint {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Query box in degrees, in Overpass order (south, west, north, east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.south
            && point.latitude <= self.north
            && point.longitude >= self.west
            && point.longitude <= self.east
    }

    /// The box as a Waze alert chunk: `[south, north, west, east]`.
    pub fn waze_chunk(&self) -> [f64; 4] {
        [self.south, self.north, self.west, self.east]
    }
}

/// A highway route to collect data for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub id: String,
    pub name: String,
    pub start: Endpoint,
    pub end: Endpoint,
    pub bbox: BoundingBox,
}

/// The UAE highway routes the collector ships with.
pub fn builtin_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            id: "e311-mbz".to_string(),
            name: "E311 Sheikh Mohammed bin Zayed Road (Abu Dhabi to RAK)".to_string(),
            start: Endpoint::new("Al Falah City Abu Dhabi", 24.45, 54.32),
            end: Endpoint::new("RAK City Center", 25.79, 55.94),
            bbox: BoundingBox::new(24.3, 54.2, 25.9, 56.1),
        },
        RouteConfig {
            id: "e611-emirates".to_string(),
            name: "E611 Emirates Road (Dubai bypass)".to_string(),
            start: Endpoint::new("Sharjah International Airport", 25.33, 55.52),
            end: Endpoint::new("Jebel Ali Port", 25.01, 55.06),
            bbox: BoundingBox::new(24.9, 55.0, 25.4, 55.6),
        },
        RouteConfig {
            id: "e11-coastal".to_string(),
            name: "E11 Sheikh Zayed Road (Abu Dhabi to Fujairah coastal)".to_string(),
            start: Endpoint::new("Abu Dhabi Marina Mall", 24.49, 54.32),
            end: Endpoint::new("Fujairah City Center", 25.12, 56.33),
            bbox: BoundingBox::new(24.4, 54.2, 25.2, 56.5),
        },
        RouteConfig {
            id: "e44-hatta".to_string(),
            name: "E44 Dubai-Hatta Road".to_string(),
            start: Endpoint::new("Dubai Festival City", 25.22, 55.35),
            end: Endpoint::new("Hatta Border", 24.81, 56.13),
            bbox: BoundingBox::new(24.7, 55.3, 25.3, 56.2),
        },
        RouteConfig {
            id: "e66-kalba".to_string(),
            name: "E66 Sharjah-Kalba Road".to_string(),
            start: Endpoint::new("Sharjah University City", 25.31, 55.45),
            end: Endpoint::new("Kalba Corniche", 25.07, 56.35),
            bbox: BoundingBox::new(25.0, 55.4, 25.4, 56.4),
        },
        RouteConfig {
            id: "e66-alain".to_string(),
            name: "E66 Al Ain Road (Dubai to Al Ain)".to_string(),
            start: Endpoint::new("Dubai Academic City", 25.11, 55.41),
            end: Endpoint::new("Al Ain Oasis", 24.21, 55.76),
            bbox: BoundingBox::new(24.1, 55.3, 25.2, 55.8),
        },
    ]
}

/// Route bounding box wrapper for R-tree indexing.
#[derive(Debug, Clone)]
struct RouteBox {
    index: usize,
    bbox: BoundingBox,
}

impl RTreeObject for RouteBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.west, self.bbox.south],
            [self.bbox.east, self.bbox.north],
        )
    }
}

/// Ordered set of routes with a spatial index over their boxes.
#[derive(Debug)]
pub struct RouteCatalog {
    routes: Vec<RouteConfig>,
    tree: RTree<RouteBox>,
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::new(builtin_routes())
    }
}

impl RouteCatalog {
    /// Build a catalog; route order is kept for iteration.
    pub fn new(routes: Vec<RouteConfig>) -> Self {
        let boxes = routes
            .iter()
            .enumerate()
            .map(|(index, r)| RouteBox {
                index,
                bbox: r.bbox,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(boxes),
            routes,
        }
    }

    /// Load a catalog from a JSON array of route configs.
    pub fn from_json(json: &str) -> Result<Self> {
        let routes: Vec<RouteConfig> = serde_json::from_str(json)?;
        Ok(Self::new(routes))
    }

    pub fn get(&self, id: &str) -> Result<&RouteConfig> {
        self.routes
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RouteSnapError::UnknownRoute(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteConfig> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes whose bounding box contains the point, in catalog order.
    pub fn routes_covering(&self, point: &GeoPoint) -> Vec<&RouteConfig> {
        let query = AABB::from_point([point.longitude, point.latitude]);
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|b| b.index)
            .collect();
        indices.sort_unstable();

        indices.into_iter().map(|i| &self.routes[i]).collect()
    }

    /// Split a region-wide point list by route.
    ///
    /// A point inside several overlapping boxes is assigned to each of
    /// them; points outside every box are dropped. Every catalog route gets
    /// an entry, possibly empty.
    pub fn assign_points(&self, points: &[PointOfInterest]) -> HashMap<String, Vec<PointOfInterest>> {
        let mut assigned: HashMap<String, Vec<PointOfInterest>> = self
            .routes
            .iter()
            .map(|r| (r.id.clone(), Vec::new()))
            .collect();

        for point in points {
            for route in self.routes_covering(&point.location) {
                if let Some(list) = assigned.get_mut(&route.id) {
                    list.push(point.clone());
                }
            }
        }

        assigned
    }
}
