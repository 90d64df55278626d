//! Point-data and routing service collaborators.
//!
//! Speed cameras come from an Overpass `highway=speed_camera` query, route
//! geometry from OSRM. Fetching is left to a [`RouteDataSource`]
//! implementation; this module owns the request shapes and the decoding of
//! the response bodies, so every source reports failures the same way:
//! [`RouteSnapError::ServiceUnavailable`] when nothing could be obtained,
//! [`RouteSnapError::MalformedResponse`] when the body is not what the
//! service documents, [`RouteSnapError::NoRoute`] when OSRM found nothing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{OptionExt, Result, RouteSnapError, Service};
use crate::route::{BoundingBox, RouteCatalog, RouteConfig};
use crate::{GeoPoint, Polyline, PointOfInterest, TravelDirection};

/// Public OSRM driving endpoint.
pub const OSRM_DRIVING_URL: &str = "https://router.project-osrm.org/route/v1/driving";

/// Public Overpass interpreter endpoint.
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Speed limit reported for cameras without a `maxspeed` tag.
pub const UNKNOWN_SPEED_LIMIT: &str = "?";

/// Route geometry for one leg as returned by the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub polyline: Polyline,
    /// Leg length in meters as reported by the service
    pub distance_m: f64,
    /// Leg duration in seconds as reported by the service
    pub duration_s: f64,
}

/// Supplies raw camera points and route geometry for catalog routes.
pub trait RouteDataSource {
    /// Speed cameras inside the route's bounding box.
    fn cameras(&self, route: &RouteConfig) -> Result<Vec<PointOfInterest>>;

    /// Geometry for one direction: `Forward` is start → end.
    fn geometry(&self, route: &RouteConfig, leg: TravelDirection) -> Result<RouteGeometry>;
}

/// Overpass QL query for speed camera nodes inside a box.
pub fn overpass_query(bbox: &BoundingBox) -> String {
    format!(
        "[out:json][timeout:30];\n(\n  node[\"highway\"=\"speed_camera\"]({},{},{},{});\n);\nout geom;\n",
        bbox.south, bbox.west, bbox.north, bbox.east
    )
}

/// OSRM route request URL for a full-overview GeoJSON geometry.
pub fn osrm_route_url(base: &str, from: &GeoPoint, to: &GeoPoint) -> String {
    format!(
        "{}/{},{};{},{}?overview=full&geometries=geojson",
        base.trim_end_matches('/'),
        from.longitude,
        from.latitude,
        to.longitude,
        to.latitude
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Option<Vec<Value>>,
}

/// Decode an Overpass JSON body into camera points.
///
/// Each node becomes a point with `speed_limit` (the `maxspeed` tag, or
/// `"?"`) and `source: "osm"`. Non-node elements are skipped.
pub fn parse_overpass_cameras(body: &str) -> Result<Vec<PointOfInterest>> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| RouteSnapError::MalformedResponse {
            service: Service::Overpass,
            reason: e.to_string(),
        })?;

    let mut cameras = Vec::new();
    for element in response.elements.unwrap_or_default() {
        let kind = element.get("type").and_then(Value::as_str).unwrap_or("node");
        if kind != "node" {
            debug!("[Overpass] skipping {} element", kind);
            continue;
        }

        let lat = element
            .get("lat")
            .and_then(Value::as_f64)
            .ok_or_malformed(Service::Overpass, "node without numeric 'lat'")?;
        let lon = element
            .get("lon")
            .and_then(Value::as_f64)
            .ok_or_malformed(Service::Overpass, "node without numeric 'lon'")?;

        let speed_limit = element
            .get("tags")
            .and_then(|tags| tags.get("maxspeed"))
            .cloned()
            .unwrap_or_else(|| Value::from(UNKNOWN_SPEED_LIMIT));

        cameras.push(
            PointOfInterest::new(lat, lon)
                .with_attribute("speed_limit", speed_limit)
                .with_attribute("source", "osm"),
        );
    }

    info!("[Overpass] found {} speed cameras", cameras.len());
    Ok(cameras)
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Option<OsrmGeometry>,
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Decode an OSRM route body (GeoJSON geometry) into the first route.
pub fn parse_osrm_route(body: &str) -> Result<RouteGeometry> {
    let response: OsrmResponse =
        serde_json::from_str(body).map_err(|e| RouteSnapError::MalformedResponse {
            service: Service::Osrm,
            reason: e.to_string(),
        })?;

    let code = response.code.unwrap_or_default();
    if code != "Ok" {
        if let Some(message) = &response.message {
            warn!("[OSRM] {}: {}", code, message);
        }
        return Err(RouteSnapError::NoRoute { code });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RouteSnapError::NoRoute { code })?;

    let geometry = route
        .geometry
        .ok_or_malformed(Service::Osrm, "route without 'geometry'")?;
    let distance_m = route
        .distance
        .ok_or_malformed(Service::Osrm, "route without 'distance'")?;
    let duration_s = route
        .duration
        .ok_or_malformed(Service::Osrm, "route without 'duration'")?;

    Ok(RouteGeometry {
        polyline: Polyline::from_lon_lat(&geometry.coordinates),
        distance_m,
        duration_s,
    })
}

/// Source backed by response bodies saved on disk.
///
/// Layout under `root`:
/// - `<id>/cameras.json` - Overpass body for the route's box
/// - `cameras.json` - region-wide Overpass body, split over the catalog
///   when a route has no file of its own
/// - `<id>/forward.json`, `<id>/reverse.json` - OSRM bodies per leg
#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
    regional: Option<HashMap<String, Vec<PointOfInterest>>>,
}

impl DirectorySource {
    /// Open a directory, splitting any region-wide camera file over `catalog`.
    pub fn open(root: impl Into<PathBuf>, catalog: &RouteCatalog) -> Result<Self> {
        let root = root.into();
        let regional_path = root.join("cameras.json");

        let regional = if regional_path.is_file() {
            let cameras = parse_overpass_cameras(&read_body(&regional_path, Service::Overpass)?)?;
            info!(
                "[Collect] {} regional cameras from {}",
                cameras.len(),
                regional_path.display()
            );
            Some(catalog.assign_points(&cameras))
        } else {
            None
        };

        Ok(Self { root, regional })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn leg_file(leg: TravelDirection) -> &'static str {
        match leg {
            TravelDirection::Forward => "forward.json",
            TravelDirection::Reverse => "reverse.json",
        }
    }
}

impl RouteDataSource for DirectorySource {
    fn cameras(&self, route: &RouteConfig) -> Result<Vec<PointOfInterest>> {
        let path = self.root.join(&route.id).join("cameras.json");
        if path.is_file() {
            // Taken as saved; points outside the box end up off-route.
            return parse_overpass_cameras(&read_body(&path, Service::Overpass)?);
        }

        match &self.regional {
            Some(assigned) => Ok(assigned.get(&route.id).cloned().unwrap_or_default()),
            None => Err(RouteSnapError::ServiceUnavailable {
                service: Service::Overpass,
                reason: format!("no camera data for '{}' in {}", route.id, self.root.display()),
            }),
        }
    }

    fn geometry(&self, route: &RouteConfig, leg: TravelDirection) -> Result<RouteGeometry> {
        let path = self.root.join(&route.id).join(Self::leg_file(leg));
        parse_osrm_route(&read_body(&path, Service::Osrm)?)
    }
}

fn read_body(path: &Path, service: Service) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RouteSnapError::ServiceUnavailable {
        service,
        reason: format!("{}: {}", path.display(), e),
    })
}
