//! routesnap CLI - Route data collection tool
//!
//! Usage:
//!   routesnap-cli routes [--catalog <file>]
//!   routesnap-cli requests [--route <id>]
//!   routesnap-cli collect <data-dir> --output <dir> [--route <id>] [--threshold <m>] [--gpx]
//!   routesnap-cli snap --track <route.gpx> --cameras <overpass.json> [--threshold <m>]
//!   routesnap-cli index <dir> [--generated-at <timestamp>]
//!
//! `collect` works from saved Overpass/OSRM response bodies (see
//! `DirectorySource` for the layout); `requests` prints the queries to
//! fetch them with.

use clap::{Parser, Subcommand};
use geo::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use log::{error, info, warn};
use routesnap::{
    classify_points, collect_route,
    index::INDEX_FILE_NAME,
    sources::{
        osrm_route_url, overpass_query, parse_overpass_cameras, OSRM_DRIVING_URL, OVERPASS_URL,
    },
    DirectorySource, GeoPoint, PointOfInterest, Polyline, RouteCatalog, RouteConfig,
    RouteSnapshot, RoutesIndex, SnapConfig,
};
use serde_json::Value;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "routesnap-cli")]
#[command(about = "Speed camera snapping for highway routes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Route catalog JSON (defaults to the built-in routes)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog routes
    Routes,

    /// Print the Overpass query and OSRM URLs for each route
    Requests {
        /// Only this route
        #[arg(short, long)]
        route: Option<String>,
    },

    /// Build route snapshots from saved service responses
    Collect {
        /// Directory with saved Overpass/OSRM responses
        data_dir: PathBuf,

        /// Output directory for <id>.json / <id>.js
        #[arg(short, long)]
        output: PathBuf,

        /// Only this route
        #[arg(short, long)]
        route: Option<String>,

        /// Snap threshold in meters
        #[arg(long, default_value = "750")]
        threshold: f64,

        /// Also write <id>.gpx (route track + camera waypoints)
        #[arg(long)]
        gpx: bool,
    },

    /// Snap cameras onto a GPX track
    Snap {
        /// GPX file whose first track is the forward route
        #[arg(long)]
        track: PathBuf,

        /// GPX file for the reverse route (defaults to the forward track reversed)
        #[arg(long)]
        reverse_track: Option<PathBuf>,

        /// Overpass response body with the camera nodes
        #[arg(long)]
        cameras: PathBuf,

        /// Snap threshold in meters
        #[arg(long, default_value = "750")]
        threshold: f64,
    },

    /// Write routes-index.json for the snapshots in a directory
    Index {
        /// Directory containing <id>.json snapshots
        dir: PathBuf,

        /// Timestamp recorded in the summary
        #[arg(long)]
        generated_at: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Routes => {
            run_routes(&catalog);
            Ok(())
        }
        Commands::Requests { route } => run_requests(&catalog, route.as_deref()),
        Commands::Collect {
            data_dir,
            output,
            route,
            threshold,
            gpx,
        } => run_collect(
            &catalog,
            &data_dir,
            &output,
            route.as_deref(),
            &SnapConfig {
                threshold_m: threshold,
            },
            gpx,
        ),
        Commands::Snap {
            track,
            reverse_track,
            cameras,
            threshold,
        } => run_snap(
            &track,
            reverse_track.as_deref(),
            &cameras,
            &SnapConfig {
                threshold_m: threshold,
            },
        ),
        Commands::Index { dir, generated_at } => run_index(&dir, generated_at),
    }
}

fn load_catalog(path: Option<&Path>) -> CliResult<RouteCatalog> {
    match path {
        Some(path) => {
            let catalog = RouteCatalog::from_json(&fs::read_to_string(path)?)?;
            info!("Loaded {} routes from {}", catalog.len(), path.display());
            Ok(catalog)
        }
        None => Ok(RouteCatalog::default()),
    }
}

fn selected<'a>(
    catalog: &'a RouteCatalog,
    only: Option<&str>,
) -> CliResult<Vec<&'a RouteConfig>> {
    match only {
        Some(id) => Ok(vec![catalog.get(id)?]),
        None => Ok(catalog.iter().collect()),
    }
}

/// Print the catalog
fn run_routes(catalog: &RouteCatalog) {
    println!("\n{}", "=".repeat(60));
    println!("ROUTES ({})", catalog.len());
    println!("{}", "=".repeat(60));

    for route in catalog.iter() {
        println!("\n  {} - {}", route.id, route.name);
        println!(
            "    Start: {} ({:.4}, {:.4})",
            route.start.name, route.start.lat, route.start.lon
        );
        println!(
            "    End:   {} ({:.4}, {:.4})",
            route.end.name, route.end.lat, route.end.lon
        );
        println!(
            "    BBox:  S {:.2} W {:.2} N {:.2} E {:.2}",
            route.bbox.south, route.bbox.west, route.bbox.north, route.bbox.east
        );
    }
}

/// Print the upstream requests needed to populate a data directory
fn run_requests(catalog: &RouteCatalog, only: Option<&str>) -> CliResult {
    for route in selected(catalog, only)? {
        let start = route.start.point();
        let end = route.end.point();

        println!("\n# {} - {}", route.id, route.name);
        println!("# POST {} -> {}/cameras.json", OVERPASS_URL, route.id);
        print!("{}", overpass_query(&route.bbox));
        println!(
            "# GET -> {}/forward.json\n{}",
            route.id,
            osrm_route_url(OSRM_DRIVING_URL, &start, &end)
        );
        println!(
            "# GET -> {}/reverse.json\n{}",
            route.id,
            osrm_route_url(OSRM_DRIVING_URL, &end, &start)
        );
    }
    Ok(())
}

/// Build and write snapshots, skipping routes that fail
fn run_collect(
    catalog: &RouteCatalog,
    data_dir: &Path,
    output: &Path,
    only: Option<&str>,
    config: &SnapConfig,
    write_gpx: bool,
) -> CliResult {
    let routes = selected(catalog, only)?;
    let source = DirectorySource::open(data_dir, catalog)?;
    fs::create_dir_all(output)?;

    println!("\n{}", "=".repeat(60));
    println!("COLLECTING {} ROUTES from {}", routes.len(), data_dir.display());
    println!("{}", "=".repeat(60));

    let mut written = 0;
    for (i, route) in routes.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, routes.len(), route.id);

        let snapshot = match collect_route(route, &source, config) {
            Ok(s) => s,
            Err(e) => {
                warn!("  [ERR] {}: {}", route.id, e);
                continue;
            }
        };

        write_snapshot(&snapshot, output)?;
        if write_gpx {
            write_gpx_file(&snapshot, &output.join(format!("{}.gpx", snapshot.id)))?;
        }

        println!("  [OK] Saved {} data files", snapshot.id);
        println!("    Distance: {}km", snapshot.distance_km);
        println!("    Duration: {}min", snapshot.duration_min);
        println!(
            "    Cameras: {} ({} off-route)",
            snapshot.cameras.len(),
            snapshot.cameras_offroute.len()
        );
        written += 1;
    }

    println!("\nCollected {}/{} routes", written, routes.len());
    Ok(())
}

fn write_snapshot(snapshot: &RouteSnapshot, output: &Path) -> CliResult {
    fs::write(
        output.join(format!("{}.json", snapshot.id)),
        snapshot.to_json_pretty()?,
    )?;
    fs::write(
        output.join(format!("{}.js", snapshot.id)),
        snapshot.to_js_module()?,
    )?;
    Ok(())
}

/// Snap cameras onto GPX tracks and print the result
fn run_snap(
    track: &Path,
    reverse_track: Option<&Path>,
    cameras: &Path,
    config: &SnapConfig,
) -> CliResult {
    let forward = read_gpx_track(track)?;
    let reverse = match reverse_track {
        Some(path) => read_gpx_track(path)?,
        None => forward.reversed(),
    };
    let cameras = parse_overpass_cameras(&fs::read_to_string(cameras)?)?;

    println!(
        "\nRoute: {} points, {:.1}km",
        forward.len(),
        forward.length_m() / 1000.0
    );

    let result = classify_points(&cameras, &forward, &reverse, config);

    println!("\n{}", "-".repeat(60));
    println!(
        "RESULTS: {} on-route, {} off-route (threshold {}m)",
        result.on_route.len(),
        result.off_route.len(),
        config.threshold_m
    );
    println!("{}", "-".repeat(60));

    for camera in &result.on_route {
        println!(
            "  km {:>7.2}  seg {:>5}  {:>4}m  ({:.5}, {:.5})  limit {}",
            camera.route_km,
            camera.route_idx,
            camera.snap_m,
            camera.snap_lat,
            camera.snap_lon,
            speed_limit(&camera.point)
        );
    }
    for camera in &result.off_route {
        println!(
            "  off-route  ({:.5}, {:.5})  {}",
            camera.point.location.latitude,
            camera.point.location.longitude,
            camera
                .snap_m
                .map_or_else(|| "no segments".to_string(), |m| format!("{}m", m))
        );
    }

    Ok(())
}

fn speed_limit(point: &PointOfInterest) -> String {
    match point.attribute("speed_limit") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

/// Load the first track of a GPX file as a polyline
fn read_gpx_track(path: &Path) -> CliResult<Polyline> {
    let reader = BufReader::new(File::open(path)?);
    let gpx: Gpx = gpx::read(reader)?;

    let points: Vec<GeoPoint> = gpx
        .tracks
        .first()
        .map(|track| {
            track
                .segments
                .iter()
                .flat_map(|segment| segment.points.iter())
                .map(|pt| GeoPoint::new(pt.point().y(), pt.point().x()))
                .collect()
        })
        .unwrap_or_default();

    if points.is_empty() {
        return Err(format!("no track points in {}", path.display()).into());
    }
    Ok(Polyline::from_points(points))
}

/// Write the forward route as a track and on-route cameras as waypoints
fn write_gpx_file(snapshot: &RouteSnapshot, path: &Path) -> CliResult {
    let mut segment = TrackSegment::new();
    segment.points = snapshot
        .route_ab
        .iter()
        .map(|[lat, lon]| Waypoint::new(Point::new(*lon, *lat)))
        .collect();

    let mut track = Track::new();
    track.name = Some(snapshot.name.clone());
    track.segments.push(segment);

    let waypoints = snapshot
        .cameras
        .iter()
        .map(|camera| {
            let mut wp = Waypoint::new(Point::new(camera.snap_lon, camera.snap_lat));
            wp.name = Some(format!("km {:.2}", camera.route_km));
            wp.description = Some(format!("speed limit {}", speed_limit(&camera.point)));
            wp
        })
        .collect();

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("routesnap-cli".to_string()),
        waypoints,
        tracks: vec![track],
        ..Default::default()
    };

    gpx::write(&gpx, BufWriter::new(File::create(path)?))?;
    Ok(())
}

/// Summarise the snapshots in a directory into routes-index.json
fn run_index(dir: &Path, generated_at: Option<String>) -> CliResult {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != INDEX_FILE_NAME)
        })
        .collect();
    paths.sort();

    println!("Found {} route data files", paths.len());

    let mut snapshots = Vec::new();
    for path in &paths {
        match fs::read_to_string(path)
            .map_err(Box::<dyn Error>::from)
            .and_then(|json| RouteSnapshot::from_json(&json).map_err(Box::<dyn Error>::from))
        {
            Ok(snapshot) => {
                println!(
                    "  [OK] {}: {}km, {} cameras",
                    snapshot.id,
                    snapshot.distance_km,
                    snapshot.cameras.len()
                );
                snapshots.push(snapshot);
            }
            Err(e) => warn!("  [ERR] {}: {}", path.display(), e),
        }
    }

    let index = RoutesIndex::from_snapshots(&snapshots, generated_at);
    let index_path = dir.join(INDEX_FILE_NAME);
    fs::write(&index_path, serde_json::to_string_pretty(&index)?)?;

    println!("\nCreated routes index: {}", index_path.display());
    println!("  Total routes: {}", index.summary.total_routes);
    println!("  Total cameras: {}", index.summary.total_cameras);
    println!("  Total distance: {} km", index.summary.total_distance_km);
    Ok(())
}
