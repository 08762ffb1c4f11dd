use citibike_dashboard::aggregator::aggregate::{
    align_daily_series, filter_by_rider_type, filter_by_season, hourly_distribution, summary,
    top_stations,
};
use citibike_dashboard::aggregator::season::{RiderType, Season};
use citibike_dashboard::cache::DataCache;
use citibike_dashboard::loader::{load_trips, load_trips_from_path, load_weather};
use citibike_dashboard::map::load_map;
use citibike_dashboard::output::export_views;
use citibike_dashboard::report;
use chrono::NaiveDate;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::Path;

const TRIPS: &[u8] = include_bytes!("fixtures/trips.csv");
const DAILY: &[u8] = include_bytes!("fixtures/daily.csv");

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn names(ranking: &citibike_dashboard::aggregator::types::StationRanking) -> Vec<(&str, usize)> {
    ranking
        .entries()
        .iter()
        .map(|s| (s.station_name.as_str(), s.trip_count))
        .collect()
}

#[test]
fn test_full_pipeline() {
    let trips = load_trips(TRIPS).unwrap();
    assert_eq!(trips.len(), 12);

    let ranking = top_stations(&trips, 20);
    assert_eq!(
        names(&ranking),
        vec![
            ("W 21 St & 6 Ave", 4),
            ("Broadway & E 14 St", 3),
            ("West St & Chambers St", 3),
            ("8 Ave & W 31 St", 2),
        ]
    );

    let peak = hourly_distribution(&trips).peak().unwrap();
    assert_eq!((peak.hour, peak.trip_count), (17, 5));

    let s = summary(&trips);
    assert_eq!(s.total_count, 12);
    assert_eq!(s.top_station_name.as_deref(), Some("W 21 St & 6 Ave"));
}

#[test]
fn test_seasonal_rankings() {
    let trips = load_trips(TRIPS).unwrap();

    let winter = top_stations(&filter_by_season(&trips, &[Season::Winter]), 20);
    assert_eq!(
        names(&winter),
        vec![("W 21 St & 6 Ave", 2), ("Broadway & E 14 St", 2)]
    );

    let summer = top_stations(&filter_by_season(&trips, &[Season::Summer]), 1);
    assert_eq!(names(&summer), vec![("West St & Chambers St", 3)]);

    assert_eq!(filter_by_season(&trips, &Season::ALL), trips);
    assert!(filter_by_season(&trips, &[]).is_empty());
}

#[test]
fn test_peak_hour_by_rider_type() {
    let trips = load_trips(TRIPS).unwrap();

    let members = hourly_distribution(&filter_by_rider_type(&trips, &[RiderType::Member]));
    let peak = members.peak().unwrap();
    assert_eq!((peak.hour, peak.trip_count), (8, 3));

    let casual = hourly_distribution(&filter_by_rider_type(&trips, &[RiderType::Casual]));
    let peak = casual.peak().unwrap();
    assert_eq!((peak.hour, peak.trip_count), (17, 3));
}

#[test]
fn test_daily_series_alignment() {
    let weather = load_weather(DAILY).unwrap();
    let series = align_daily_series(&weather);

    let dates: Vec<_> = series.iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect();
    assert_eq!(dates, vec!["2022-01-01", "2022-01-02", "2022-01-03", "2022-01-07"]);
    assert_eq!(series[3].trip_count, 18430);
    assert_eq!(series[3].avg_temperature, -2.1);
    assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
}

#[test]
fn test_gzipped_source() {
    let path = std::env::temp_dir().join("citibike_dashboard_it_trips.csv.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(TRIPS).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let trips = load_trips_from_path(&path).unwrap();
    assert_eq!(trips, load_trips(TRIPS).unwrap());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_cache_and_pages_from_files() {
    let cache = DataCache::new(fixture("trips.csv"), fixture("daily.csv"));

    let page = report::stations_page(cache.trips(), &Season::ALL, 2);
    assert!(page.contains("Top 2 start stations"));
    assert!(page.contains("W 21 St & 6 Ave"));

    let page = report::weather_page(cache.weather());
    assert!(page.contains("Total rides: 97,101"));

    let page = report::recommendations_page(cache.trips());
    assert!(page.contains("Top demand station: W 21 St & 6 Ave"));

    let map = load_map(&fixture("map.html")).unwrap();
    assert!(map.html().unwrap().contains("NYC Bike Trips"));
}

#[test]
fn test_missing_inputs_do_not_break_pages() {
    let cache = DataCache::new("/nonexistent/trips.csv", "/nonexistent/daily.csv");

    let page = report::peak_hours_page(cache.trips(), &RiderType::ALL);
    assert!(page.contains("WARNING"));
    assert!(page.contains(report::NO_DATA));

    let page = report::weather_page(cache.weather());
    assert!(page.contains(report::NO_DATA));

    let page = report::map_page(&load_map(Path::new("/nonexistent/map.html")).unwrap());
    assert!(page.contains("Map file not found"));
}

#[test]
fn test_export_views() {
    let dir = std::env::temp_dir().join("citibike_dashboard_it_export");
    let _ = std::fs::remove_dir_all(&dir);

    let trips = load_trips(TRIPS).unwrap();
    let weather = load_weather(DAILY).unwrap();
    export_views(&dir, &trips, &weather, 3, false).unwrap();

    let stations = std::fs::read_to_string(dir.join("stations.csv")).unwrap();
    assert_eq!(stations.lines().count(), 4);
    assert!(stations.lines().nth(1).unwrap().starts_with("W 21 St & 6 Ave,4"));

    let hourly = std::fs::read_to_string(dir.join("hourly.csv")).unwrap();
    assert_eq!(hourly.lines().next(), Some("hour,trip_count"));
    assert!(hourly.contains("17,5"));

    let daily = std::fs::read_to_string(dir.join("daily.csv")).unwrap();
    assert_eq!(daily.lines().nth(1), Some("2022-01-01,20428,11.6"));

    std::fs::remove_dir_all(&dir).unwrap();
}
