//! CLI entry point for the Citi Bike dashboard.
//!
//! Each subcommand renders one dashboard page from the trip sample and the
//! merged daily weather file, or exports every view to disk.

use anyhow::Result;
use citibike_dashboard::aggregator::aggregate::{
    DEFAULT_TOP_N, align_daily_series, available_rider_types, available_seasons,
    daily_series_stats, filter_by_rider_type, filter_by_season, hourly_distribution, summary,
    top_stations,
};
use citibike_dashboard::aggregator::season::{RiderType, Season};
use citibike_dashboard::cache::DataCache;
use citibike_dashboard::config::DashboardConfig;
use citibike_dashboard::map::{MapArtifact, load_map};
use citibike_dashboard::output::{export_views, print_json};
use citibike_dashboard::report;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "citibike_dashboard")]
#[command(about = "NYC Citi Bike usage dashboard", long_about = None)]
struct Cli {
    /// Trip sample CSV (overrides TRIPS_CSV)
    #[arg(long, global = true, value_name = "PATH")]
    trips: Option<PathBuf>,

    /// Merged daily rides + weather CSV (overrides DAILY_CSV)
    #[arg(long, global = true, value_name = "PATH")]
    daily: Option<PathBuf>,

    /// Pre-rendered HTML trip map (overrides MAP_HTML)
    #[arg(long, global = true, value_name = "PATH")]
    map: Option<PathBuf>,

    /// Print the page data as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset overview
    Intro,
    /// Daily rides against average temperature
    Weather,
    /// Most popular start stations
    Stations {
        /// Seasons to include (defaults to every season in the data)
        #[arg(short, long, value_enum)]
        season: Vec<Season>,

        /// Number of stations to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
    /// Aggregated trip-flow map
    Map,
    /// Hourly demand and the peak hour
    PeakHours {
        /// Rider types to include (defaults to every type in the data)
        #[arg(short, long, value_enum)]
        rider: Vec<RiderType>,
    },
    /// Headline numbers and recommendations
    Recommendations,
    /// Write every view to CSV/JSON files
    Export {
        /// Directory to write into
        #[arg(short, long, default_value = "dashboard_export")]
        out_dir: PathBuf,

        /// Number of stations in the ranking
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Gzip compress the exported files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/citibike_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("citibike_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = DashboardConfig::from_env().with_overrides(cli.trips, cli.daily, cli.map);
    info!(
        trips = %config.trips_path.display(),
        daily = %config.daily_path.display(),
        map = %config.map_path.display(),
        "Dashboard configured"
    );
    let cache = DataCache::new(&config.trips_path, &config.daily_path);

    match cli.command {
        Commands::Intro => {
            let trips = cache.trips();
            let weather = cache.weather();
            if cli.json {
                print_json(&json!({
                    "trips": trips.table.len(),
                    "days": weather.table.len(),
                    "warnings": [&trips.warning, &weather.warning],
                }))?;
            } else {
                println!("{}", report::intro_page(trips, weather));
            }
        }
        Commands::Weather => {
            let weather = cache.weather();
            if cli.json {
                let series = align_daily_series(&weather.table);
                let stats = daily_series_stats(&series);
                print_json(&json!({
                    "series": series,
                    "stats": stats,
                    "warning": weather.warning,
                }))?;
            } else {
                println!("{}", report::weather_page(weather));
            }
        }
        Commands::Stations { season, top } => {
            let trips = cache.trips();
            let seasons = if season.is_empty() {
                available_seasons(&trips.table)
            } else {
                season
            };
            if cli.json {
                let ranking = top_stations(&filter_by_season(&trips.table, &seasons), top);
                print_json(&json!({
                    "seasons": seasons,
                    "ranking": ranking,
                    "warning": trips.warning,
                }))?;
            } else {
                println!("{}", report::stations_page(trips, &seasons, top));
            }
        }
        Commands::Map => {
            let map = load_map(&config.map_path)?;
            if cli.json {
                print_json(&json!({
                    "path": config.map_path.display().to_string(),
                    "found": matches!(map, MapArtifact::Loaded(_)),
                    "bytes": map.html().map(str::len),
                }))?;
            } else {
                println!("{}", report::map_page(&map));
            }
        }
        Commands::PeakHours { rider } => {
            let trips = cache.trips();
            let riders = if rider.is_empty() {
                available_rider_types(&trips.table)
            } else {
                rider
            };
            if cli.json {
                let distribution = hourly_distribution(&filter_by_rider_type(&trips.table, &riders));
                let hourly: Vec<_> = distribution.iter().collect();
                print_json(&json!({
                    "rider_types": riders,
                    "hourly": hourly,
                    "peak": distribution.peak(),
                    "warning": trips.warning,
                }))?;
            } else {
                println!("{}", report::peak_hours_page(trips, &riders));
            }
        }
        Commands::Recommendations => {
            let trips = cache.trips();
            if cli.json {
                print_json(&json!({
                    "summary": summary(&trips.table),
                    "warning": trips.warning,
                }))?;
            } else {
                println!("{}", report::recommendations_page(trips));
            }
        }
        Commands::Export { out_dir, top, gzip } => {
            let trips = cache.trips();
            let weather = cache.weather();
            for w in [&trips.warning, &weather.warning].into_iter().flatten() {
                warn!(warning = %w, "Exporting with missing input");
            }
            let written = export_views(&out_dir, &trips.table, &weather.table, top, gzip)?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
