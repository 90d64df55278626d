//! Snapping points of interest onto route polylines.
//!
//! This module provides the core geometric matching:
//! - Three-sample point-to-polyline distance with nearest-endpoint snap
//! - Cumulative route distance (route-km) up to a segment
//! - On-route / off-route classification against a forward/reverse pair
//!
//! The point-to-segment distance is the minimum over the two endpoints and
//! the midpoint, not a perpendicular projection. Published route data
//! depends on this exact output.

use log::{debug, info};

use crate::geo_utils::{haversine_distance, midpoint, round_to};
use crate::{
    CameraDirection, ClassificationResult, ClassifiedPoint, GeoPoint, OffRoutePoint, Polyline,
    PointOfInterest, SnapConfig, SnapResult, TravelDirection,
};

/// Find the closest segment of a polyline to a point.
///
/// For every segment the distance is the minimum of the distances to its
/// first endpoint, its second endpoint and its midpoint. The segment with
/// the smallest such distance wins; earlier segments win ties. The snapped
/// coordinate is whichever endpoint of that segment is nearer, the second
/// one on a tie.
///
/// Returns `None` when the polyline has fewer than two points, or when no
/// segment yields a finite distance.
///
/// # Example
/// ```
/// use routesnap::{GeoPoint, snap_to_polyline};
///
/// let line = vec![GeoPoint::new(25.0, 55.0), GeoPoint::new(25.0, 55.1)];
/// let snap = snap_to_polyline(&GeoPoint::new(25.001, 55.1), &line).unwrap();
/// assert_eq!(snap.segment_index, 0);
/// assert_eq!(snap.snapped, GeoPoint::new(25.0, 55.1));
/// ```
pub fn snap_to_polyline(point: &GeoPoint, polyline: &[GeoPoint]) -> Option<SnapResult> {
    let mut best: Option<SnapResult> = None;

    for (i, segment) in polyline.windows(2).enumerate() {
        let (start, end) = (&segment[0], &segment[1]);

        let to_start = haversine_distance(point, start);
        let to_end = haversine_distance(point, end);
        let to_mid = haversine_distance(point, &midpoint(start, end));

        let segment_distance = to_start.min(to_end).min(to_mid);

        let current = best.map_or(f64::INFINITY, |b| b.distance_m);
        if segment_distance < current {
            best = Some(SnapResult {
                distance_m: segment_distance,
                segment_index: i,
                snapped: if to_start < to_end { *start } else { *end },
            });
        }
    }

    best
}

/// Distance along the polyline from its start to the start of a segment, in km.
///
/// Sums the lengths of segments `0..segment_index`; index 0 yields 0.
/// No distance inside the target segment is added. Indices past the last
/// segment are clamped to the full polyline length.
pub fn route_km(polyline: &[GeoPoint], segment_index: usize) -> f64 {
    let meters: f64 = polyline
        .windows(2)
        .take(segment_index)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum();

    meters / 1000.0
}

/// Classify one point against a forward/reverse polyline pair.
///
/// The point is on-route iff its smaller snap distance is within
/// `config.threshold_m` (inclusive). The forward polyline wins ties.
/// A polyline without segments counts as infinitely far away.
pub fn classify_point(
    point: &PointOfInterest,
    forward: &Polyline,
    reverse: &Polyline,
    config: &SnapConfig,
) -> Classification {
    let snap_forward = snap_to_polyline(&point.location, forward.points());
    let snap_reverse = snap_to_polyline(&point.location, reverse.points());

    let dist_forward = snap_forward.map_or(f64::INFINITY, |s| s.distance_m);
    let dist_reverse = snap_reverse.map_or(f64::INFINITY, |s| s.distance_m);
    let min_distance = dist_forward.min(dist_reverse);

    let chosen = if dist_forward <= dist_reverse {
        snap_forward.map(|s| (s, forward, TravelDirection::Forward))
    } else {
        snap_reverse.map(|s| (s, reverse, TravelDirection::Reverse))
    };

    match chosen {
        Some((snap, polyline, matched)) if min_distance <= config.threshold_m => {
            let km = route_km(polyline.points(), snap.segment_index);
            Classification::OnRoute(ClassifiedPoint {
                point: point.clone(),
                snap_lat: snap.snapped.latitude,
                snap_lon: snap.snapped.longitude,
                route_km: round_to(km, 2),
                route_idx: snap.segment_index,
                snap_m: min_distance as u64,
                direction: CameraDirection::Both,
                matched,
            })
        }
        _ => Classification::OffRoute(OffRoutePoint {
            point: point.clone(),
            snap_m: min_distance.is_finite().then_some(min_distance as u64),
        }),
    }
}

/// Outcome of classifying a single point.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    OnRoute(ClassifiedPoint),
    OffRoute(OffRoutePoint),
}

/// Partition points into on-route and off-route sets.
///
/// Input order is preserved within each output set.
pub fn classify_points(
    points: &[PointOfInterest],
    forward: &Polyline,
    reverse: &Polyline,
    config: &SnapConfig,
) -> ClassificationResult {
    let classified = points
        .iter()
        .map(|p| classify_point(p, forward, reverse, config));

    collect_result(classified, forward, reverse)
}

/// Parallel version of [`classify_points`] with identical output.
#[cfg(feature = "parallel")]
pub fn classify_points_parallel(
    points: &[PointOfInterest],
    forward: &Polyline,
    reverse: &Polyline,
    config: &SnapConfig,
) -> ClassificationResult {
    use rayon::prelude::*;

    let classified: Vec<Classification> = points
        .par_iter()
        .map(|p| classify_point(p, forward, reverse, config))
        .collect();

    collect_result(classified, forward, reverse)
}

fn collect_result(
    classified: impl IntoIterator<Item = Classification>,
    forward: &Polyline,
    reverse: &Polyline,
) -> ClassificationResult {
    let mut result = ClassificationResult::default();

    for item in classified {
        match item {
            Classification::OnRoute(p) => {
                debug!(
                    "[Snap] ({:.5}, {:.5}) -> {} seg {} at {:.2} km, {} m",
                    p.point.location.latitude,
                    p.point.location.longitude,
                    p.matched,
                    p.route_idx,
                    p.route_km,
                    p.snap_m
                );
                result.on_route.push(p);
            }
            Classification::OffRoute(p) => {
                debug!(
                    "[Snap] ({:.5}, {:.5}) off-route ({:?} m)",
                    p.point.location.latitude, p.point.location.longitude, p.snap_m
                );
                result.off_route.push(p);
            }
        }
    }

    info!(
        "[Snap] {} on-route, {} off-route ({} + {} polyline points)",
        result.on_route.len(),
        result.off_route.len(),
        forward.len(),
        reverse.len()
    );

    result
}
