//! Routes index.
//!
//! Summary of all collected snapshots, longest route first, used by the
//! route picker to list routes without loading every data file.

use log::info;
use serde::{Deserialize, Serialize};

use crate::geo_utils::round_to;
use crate::route::Endpoint;
use crate::snapshot::RouteSnapshot;

/// File name of the index inside a data directory.
pub const INDEX_FILE_NAME: &str = "routes-index.json";

/// One route in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteIndexEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    pub start: Endpoint,
    pub end: Endpoint,
    pub distance_km: f64,
    pub duration_min: u32,
    /// Number of on-route cameras
    pub cameras: usize,
    #[serde(rename = "dataFile")]
    pub data_file: String,
}

impl RouteIndexEntry {
    pub fn from_snapshot(snapshot: &RouteSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            short_name: short_name(&snapshot.name),
            start: snapshot.start.clone(),
            end: snapshot.end.clone(),
            distance_km: snapshot.distance_km,
            duration_min: snapshot.duration_min,
            cameras: snapshot.cameras.len(),
            data_file: snapshot.id.clone(),
        }
    }
}

/// Totals across the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesSummary {
    pub total_routes: usize,
    pub total_cameras: usize,
    /// Sum of route distances, km rounded to one decimal
    pub total_distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// The `routes-index.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesIndex {
    pub routes: Vec<RouteIndexEntry>,
    pub summary: RoutesSummary,
}

impl RoutesIndex {
    /// Build the index; routes are ordered by distance, longest first.
    pub fn from_snapshots(snapshots: &[RouteSnapshot], generated_at: Option<String>) -> Self {
        let mut routes: Vec<RouteIndexEntry> =
            snapshots.iter().map(RouteIndexEntry::from_snapshot).collect();
        routes.sort_by(|a, b| b.distance_km.total_cmp(&a.distance_km));

        let summary = RoutesSummary {
            total_routes: routes.len(),
            total_cameras: routes.iter().map(|r| r.cameras).sum(),
            total_distance_km: round_to(routes.iter().map(|r| r.distance_km).sum(), 1),
            generated_at,
        };

        info!(
            "[Index] {} routes, {} cameras, {} km",
            summary.total_routes, summary.total_cameras, summary.total_distance_km
        );

        Self { routes, summary }
    }
}

/// Display name without the parenthesised detail, e.g.
/// `"E44 Dubai-Hatta Road"` for `"E44 Dubai-Hatta Road (via Hatta)"`.
pub fn short_name(name: &str) -> String {
    match name.split_once('(') {
        Some((head, _)) => head.trim().to_string(),
        None => name.to_string(),
    }
}
