//! Tests for route catalog

use std::collections::HashSet;

use routesnap::{
    builtin_routes, BoundingBox, GeoPoint, PointOfInterest, RouteCatalog, RouteSnapError,
};

#[test]
fn test_builtin_routes() {
    let routes = builtin_routes();
    assert_eq!(routes.len(), 6);

    let ids: HashSet<&str> = routes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 6);
    assert!(ids.contains("e311-mbz"));
    assert!(ids.contains("e66-alain"));

    for route in &routes {
        assert!(route.bbox.south < route.bbox.north, "{}", route.id);
        assert!(route.bbox.west < route.bbox.east, "{}", route.id);
        assert!(route.bbox.contains(&route.start.point()), "{}", route.id);
        assert!(route.bbox.contains(&route.end.point()), "{}", route.id);
    }
}

#[test]
fn test_bbox_contains_inclusive() {
    let bbox = BoundingBox::new(24.9, 55.0, 25.4, 55.6);
    assert!(bbox.contains(&GeoPoint::new(25.0, 55.3)));
    assert!(bbox.contains(&GeoPoint::new(24.9, 55.0)));
    assert!(bbox.contains(&GeoPoint::new(25.4, 55.6)));
    assert!(!bbox.contains(&GeoPoint::new(25.41, 55.3)));
    assert!(!bbox.contains(&GeoPoint::new(25.0, 54.99)));
}

#[test]
fn test_waze_chunk_order() {
    let bbox = BoundingBox::new(24.3, 54.2, 25.9, 56.1);
    assert_eq!(bbox.waze_chunk(), [24.3, 25.9, 54.2, 56.1]);
}

#[test]
fn test_catalog_get() {
    let catalog = RouteCatalog::default();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.get("e44-hatta").unwrap().end.name, "Hatta Border");
    assert!(matches!(
        catalog.get("nope"),
        Err(RouteSnapError::UnknownRoute(id)) if id == "nope"
    ));
}

#[test]
fn test_routes_covering() {
    let catalog = RouteCatalog::default();

    let ids: Vec<&str> = catalog
        .routes_covering(&GeoPoint::new(25.35, 55.45))
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["e311-mbz", "e611-emirates", "e66-kalba"]);

    assert!(catalog
        .routes_covering(&GeoPoint::new(20.0, 50.0))
        .is_empty());
}

#[test]
fn test_assign_points() {
    let catalog = RouteCatalog::default();
    let points = vec![
        PointOfInterest::new(25.35, 55.45).with_attribute("id", 1),
        PointOfInterest::new(20.0, 50.0).with_attribute("id", 2),
    ];

    let assigned = catalog.assign_points(&points);

    assert_eq!(assigned.len(), 6);
    assert_eq!(assigned["e311-mbz"].len(), 1);
    assert_eq!(assigned["e611-emirates"].len(), 1);
    assert_eq!(assigned["e66-kalba"].len(), 1);
    assert!(assigned["e44-hatta"].is_empty());
    assert!(assigned.values().flatten().all(|p| p.attribute("id").unwrap() == 1));
}

#[test]
fn test_catalog_from_json() {
    let json = r#"[{
        "id": "test-route",
        "name": "Test Road (somewhere)",
        "start": {"name": "A", "lat": 25.0, "lon": 55.0},
        "end": {"name": "B", "lat": 25.0, "lon": 55.2},
        "bbox": {"south": 24.9, "west": 54.9, "north": 25.1, "east": 55.3}
    }]"#;

    let catalog = RouteCatalog::from_json(json).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("test-route").unwrap().start.name, "A");
    assert_eq!(catalog.routes_covering(&GeoPoint::new(25.0, 55.1)).len(), 1);

    assert!(matches!(
        RouteCatalog::from_json("{"),
        Err(RouteSnapError::Json(_))
    ));
}
