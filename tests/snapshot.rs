//! Tests for snapshot module

use std::path::PathBuf;

use routesnap::sources::{RouteDataSource, RouteGeometry};
use routesnap::{
    collect_route, BoundingBox, DirectorySource, Endpoint, GeoPoint, PointOfInterest, Polyline,
    RouteCatalog, RouteConfig, RouteSnapError, RouteSnapshot, SnapConfig, TravelDirection,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/collect"))
}

fn test_catalog() -> RouteCatalog {
    let route = |id: &str, west: f64, east: f64| RouteConfig {
        id: id.to_string(),
        name: format!("Test {} (fixture)", id),
        start: Endpoint::new("West", 25.0, west + 0.1),
        end: Endpoint::new("East", 25.0, east - 0.1),
        bbox: BoundingBox::new(24.9, west, 25.1, east),
    };
    RouteCatalog::new(vec![
        route("straight", 54.9, 55.3),
        route("regional", 55.9, 56.3),
        route("noroute", 57.0, 57.5),
    ])
}

fn collect(id: &str) -> routesnap::Result<RouteSnapshot> {
    let catalog = test_catalog();
    let source = DirectorySource::open(fixtures_dir(), &catalog)?;
    collect_route(catalog.get(id)?, &source, &SnapConfig::default())
}

#[test]
fn test_collect_route() {
    let snapshot = collect("straight").unwrap();

    assert_eq!(snapshot.id, "straight");
    assert_eq!(snapshot.distance_km, 20.17);
    assert_eq!(snapshot.duration_min, 21);
    assert_eq!(snapshot.route_ab.len(), 3);
    assert_eq!(snapshot.route_ab[0], [25.0, 55.0]);
    assert_eq!(snapshot.route_ba[0], [25.0, 55.2]);
    assert_eq!(snapshot.waze_chunks, vec![[24.9, 25.1, 54.9, 55.3]]);
}

#[test]
fn test_collect_route_classifies_cameras() {
    let snapshot = collect("straight").unwrap();

    assert_eq!(snapshot.cameras.len(), 1);
    let camera = &snapshot.cameras[0];
    assert_eq!(camera.route_idx, 0);
    assert_eq!(camera.route_km, 0.0);
    assert_eq!(camera.snap_m, 55);
    assert_eq!(camera.matched, TravelDirection::Forward);
    assert_eq!(camera.point.attribute("speed_limit").unwrap(), "120");

    // Second camera is off-route; third lies outside the route box
    assert_eq!(snapshot.cameras_offroute.len(), 2);
    assert_eq!(snapshot.cameras_offroute[0].snap_m, Some(5559));
    assert_eq!(
        snapshot.cameras_offroute[0].point.attribute("speed_limit").unwrap(),
        "?"
    );
    assert_eq!(
        snapshot.cameras_offroute[1].point.location,
        GeoPoint::new(26.0, 55.1)
    );
    assert!(snapshot.cameras_offroute[1].snap_m.unwrap() > 100_000);
}

#[test]
fn test_collect_route_from_regional_cameras() {
    let snapshot = collect("regional").unwrap();

    assert_eq!(snapshot.cameras.len(), 1);
    assert_eq!(snapshot.cameras[0].snap_m, 0);
    assert_eq!(snapshot.cameras[0].route_km, 0.0);
    assert!(snapshot.cameras_offroute.is_empty());
    assert_eq!(snapshot.duration_min, 20);
}

#[test]
fn test_collect_route_no_route() {
    let result = collect("noroute");
    assert!(matches!(result, Err(RouteSnapError::NoRoute { .. })));
}

#[test]
fn test_snapshot_json() {
    let snapshot = collect("straight").unwrap();
    let json = snapshot.to_json_pretty().unwrap();

    assert!(json.contains("\"route_ab\""));
    assert!(json.contains("\"cameras_offroute\""));
    assert!(json.contains("\"direction\": \"both\""));

    let parsed = RouteSnapshot::from_json(&json).unwrap();
    assert_eq!(parsed.id, snapshot.id);
    assert_eq!(parsed.duration_min, snapshot.duration_min);
    assert_eq!(parsed.cameras.len(), 1);
    assert_eq!(parsed.cameras[0].route_idx, 0);
    assert_eq!(parsed.cameras[0].point.attribute("source").unwrap(), "osm");
    assert_eq!(parsed.cameras_offroute[0].snap_m, Some(5559));
}

#[test]
fn test_snapshot_js_module() {
    let snapshot = collect("straight").unwrap();
    let js = snapshot.to_js_module().unwrap();

    assert!(js.starts_with("/* Auto-generated route data */\n"));
    assert!(js.contains("window.DibbaRadar = window.DibbaRadar || {};"));
    assert!(js.contains("window.DibbaRadar._routeData = {\"id\":\"straight\""));
    assert!(js.ends_with("};"));
}

/// Source with fixed leg totals and no cameras.
struct FixedLegSource {
    distance_m: f64,
    duration_s: f64,
}

impl RouteDataSource for FixedLegSource {
    fn cameras(&self, _route: &RouteConfig) -> routesnap::Result<Vec<PointOfInterest>> {
        Ok(Vec::new())
    }

    fn geometry(
        &self,
        _route: &RouteConfig,
        leg: TravelDirection,
    ) -> routesnap::Result<RouteGeometry> {
        let line =
            Polyline::from_points(vec![GeoPoint::new(25.0, 55.0), GeoPoint::new(25.0, 55.1)]);
        Ok(RouteGeometry {
            polyline: match leg {
                TravelDirection::Forward => line,
                TravelDirection::Reverse => line.reversed(),
            },
            distance_m: self.distance_m,
            duration_s: self.duration_s,
        })
    }
}

#[test]
fn test_collect_route_rounds_ties_to_even() {
    let catalog = test_catalog();
    let route = catalog.get("straight").unwrap();
    let config = SnapConfig::default();

    let source = FixedLegSource {
        distance_m: 125.0,
        duration_s: 150.0,
    };
    let snapshot = collect_route(route, &source, &config).unwrap();
    assert_eq!(snapshot.duration_min, 2);
    assert_eq!(snapshot.distance_km, 0.12);

    let source = FixedLegSource {
        distance_m: 135.0,
        duration_s: 210.0,
    };
    let snapshot = collect_route(route, &source, &config).unwrap();
    assert_eq!(snapshot.duration_min, 4);
    assert_eq!(snapshot.distance_km, 0.14);
    assert!(snapshot.cameras.is_empty());
}
