//! Per-route snapshots.
//!
//! A snapshot is everything the radar front end needs for one route:
//! distance and duration of the forward leg, both polylines as
//! `[lat, lon]` pairs, on-route cameras with their route-km, the cameras
//! that did not snap, and the alert query chunks.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo_utils::round_to;
use crate::matching::classify_points;
use crate::route::{Endpoint, RouteConfig};
use crate::sources::RouteDataSource;
use crate::{ClassifiedPoint, OffRoutePoint, SnapConfig, TravelDirection};

/// Global the generated JS module attaches route data to.
const JS_NAMESPACE: &str = "window.DibbaRadar";

/// Collected data for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub id: String,
    pub name: String,
    pub start: Endpoint,
    pub end: Endpoint,
    /// Forward leg length, km rounded to two decimals
    pub distance_km: f64,
    /// Forward leg duration, whole minutes
    pub duration_min: u32,
    /// Forward polyline as `[lat, lon]` pairs
    pub route_ab: Vec<[f64; 2]>,
    /// Reverse polyline as `[lat, lon]` pairs
    pub route_ba: Vec<[f64; 2]>,
    pub cameras: Vec<ClassifiedPoint>,
    pub cameras_offroute: Vec<OffRoutePoint>,
    /// Alert query boxes as `[south, north, west, east]`
    pub waze_chunks: Vec<[f64; 4]>,
}

/// Fetch cameras and both legs for a route and snap the cameras.
pub fn collect_route(
    route: &RouteConfig,
    source: &dyn RouteDataSource,
    config: &SnapConfig,
) -> Result<RouteSnapshot> {
    info!("[Collect] {} ({})", route.id, route.name);

    let cameras = source.cameras(route)?;
    let forward = source.geometry(route, TravelDirection::Forward)?;
    let reverse = source.geometry(route, TravelDirection::Reverse)?;

    let classified = classify_points(&cameras, &forward.polyline, &reverse.polyline, config);

    let snapshot = RouteSnapshot {
        id: route.id.clone(),
        name: route.name.clone(),
        start: route.start.clone(),
        end: route.end.clone(),
        distance_km: round_to(forward.distance_m / 1000.0, 2),
        duration_min: (forward.duration_s / 60.0).round_ties_even() as u32,
        route_ab: forward.polyline.to_lat_lon_pairs(),
        route_ba: reverse.polyline.to_lat_lon_pairs(),
        cameras: classified.on_route,
        cameras_offroute: classified.off_route,
        waze_chunks: vec![route.bbox.waze_chunk()],
    };

    info!(
        "[Collect] {}: {:.1} km, {} min, {} cameras",
        snapshot.id,
        snapshot.distance_km,
        snapshot.duration_min,
        snapshot.cameras.len()
    );

    Ok(snapshot)
}

impl RouteSnapshot {
    /// Pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Script that registers the snapshot on the front-end namespace.
    pub fn to_js_module(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            "/* Auto-generated route data */\n{ns} = {ns} || {{}};\n{ns}._routeData = {json};",
            ns = JS_NAMESPACE,
            json = json
        ))
    }

    /// Parse a snapshot previously written with [`RouteSnapshot::to_json_pretty`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
