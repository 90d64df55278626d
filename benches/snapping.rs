//! Benchmarks for snapping and classification on synthetic highways.
//!
//! Run with: `cargo bench --bench snapping`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use routesnap::{
    classify_points, snap_to_polyline, GeoPoint, PointOfInterest, Polyline, SnapConfig,
};

/// A wandering highway of `n` vertices roughly 100 m apart.
fn synthetic_highway(n: usize, seed: u64) -> Polyline {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lat = 25.0;
    let mut lon = 55.0;
    let points = (0..n)
        .map(|_| {
            lat += rng.gen_range(-0.0005..0.0005);
            lon += 0.0009;
            GeoPoint::new(lat, lon)
        })
        .collect();
    Polyline::from_points(points)
}

/// Cameras scattered around the highway, some close and some far.
fn scattered_cameras(route: &Polyline, count: usize, seed: u64) -> Vec<PointOfInterest> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let anchor = route.points()[rng.gen_range(0..route.len())];
            PointOfInterest::new(
                anchor.latitude + rng.gen_range(-0.02..0.02),
                anchor.longitude + rng.gen_range(-0.002..0.002),
            )
            .with_attribute("speed_limit", "120")
        })
        .collect()
}

fn bench_snap_to_polyline(c: &mut Criterion) {
    let mut group = c.benchmark_group("snap_to_polyline");

    for size in [100, 1_000, 10_000] {
        let route = synthetic_highway(size, 7);
        let point = GeoPoint::new(25.003, 55.0 + 0.0009 * size as f64 / 2.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &route, |b, r| {
            b.iter(|| snap_to_polyline(black_box(&point), r.points()));
        });
    }

    group.finish();
}

fn bench_classify_points(c: &mut Criterion) {
    let forward = synthetic_highway(2_000, 11);
    let reverse = forward.reversed();
    let config = SnapConfig::default();

    let mut group = c.benchmark_group("classify_points");

    for count in [10, 100, 500] {
        let cameras = scattered_cameras(&forward, count, 13);
        group.bench_with_input(BenchmarkId::new("sequential", count), &cameras, |b, cams| {
            b.iter(|| classify_points(cams, &forward, &reverse, &config));
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", count), &cameras, |b, cams| {
            b.iter(|| routesnap::classify_points_parallel(cams, &forward, &reverse, &config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_snap_to_polyline, bench_classify_points);
criterion_main!(benches);
