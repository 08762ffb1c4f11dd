//! CSV loading and row validation for the trip and daily-weather files.
//!
//! Rows are deserialized into loosely typed raw records and validated once
//! here; rows missing a required field are dropped and never reach the
//! aggregator. A source that cannot be parsed at all yields an empty table;
//! only a failing reader (missing file, corrupt gzip stream) is an error.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::aggregator::season::RiderType;
use crate::aggregator::types::{DailyWeatherRecord, TripRecord, TripTable, WeatherTable};

const STARTED_AT: &str = "started_at";
const STARTED_AT_LEGACY: &str = "start timestamp";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    start_station_name: Option<String>,
    #[serde(default)]
    member_casual: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    bike_rides_daily: Option<String>,
    #[serde(default, rename = "avgTemp")]
    avg_temp: Option<String>,
}

/// Parses a trip start timestamp. Returns `None` for anything unparsable.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parses a calendar date, accepting a full timestamp and keeping its date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(value).map(|ts| ts.date()))
}

/// Parses a daily ride count. Float renderings of whole numbers (`"1200.0"`)
/// are accepted; negative, fractional or out-of-range values are not.
pub fn parse_trip_count(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    // u64::MAX as f64 rounds up to 2^64, which is already out of range
    if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

fn parse_temperature(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

fn validate_trip(raw: RawTrip) -> Option<TripRecord> {
    let started_at = parse_timestamp(raw.started_at.as_deref()?)?;
    let start_station_name = non_blank(raw.start_station_name)?;
    let rider_type = raw.member_casual.as_deref().and_then(RiderType::parse);

    Some(TripRecord {
        started_at,
        start_station_name,
        rider_type,
    })
}

fn validate_daily(raw: RawDaily) -> Option<DailyWeatherRecord> {
    Some(DailyWeatherRecord {
        date: parse_date(raw.date.as_deref()?)?,
        trip_count: parse_trip_count(raw.bike_rides_daily.as_deref()?)?,
        avg_temperature: parse_temperature(raw.avg_temp.as_deref()?)?,
    })
}

fn is_io_error(e: &csv::Error) -> bool {
    matches!(e.kind(), csv::ErrorKind::Io(_))
}

/// Maps the legacy `start timestamp` header onto `started_at`. When both are
/// present `started_at` is used and the legacy column is ignored.
fn renamed_trip_headers(headers: &StringRecord) -> Option<StringRecord> {
    if headers.iter().any(|h| h == STARTED_AT) || !headers.iter().any(|h| h == STARTED_AT_LEGACY)
    {
        return None;
    }
    Some(
        headers
            .iter()
            .map(|h| if h == STARTED_AT_LEGACY { STARTED_AT } else { h })
            .collect(),
    )
}

/// Reads trip rows from CSV, dropping rows without a parsable start
/// timestamp or a start station name.
///
/// # Errors
///
/// Returns an error only when the underlying reader fails (for example a
/// corrupt gzip stream). Malformed rows are dropped, not reported.
#[tracing::instrument(skip(reader))]
pub fn load_trips<R: Read>(reader: R) -> Result<TripTable> {
    let mut rdr = csv_reader(reader);

    let renamed = match rdr.headers() {
        Ok(headers) => renamed_trip_headers(headers),
        Err(e) if is_io_error(&e) => return Err(e).context("Failed to read trip data"),
        Err(e) => {
            debug!(error = %e, "Unreadable trip header");
            return Ok(TripTable::default());
        }
    };
    if let Some(headers) = renamed {
        rdr.set_headers(headers);
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.deserialize::<RawTrip>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if is_io_error(&e) => return Err(e).context("Failed to read trip data"),
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        match validate_trip(raw) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    info!(kept = records.len(), dropped, "Trip table loaded");
    Ok(TripTable::new(records))
}

/// Reads the merged daily rides/weather CSV. Rows with a missing field are
/// dropped, as is any later row repeating an already loaded date.
///
/// # Errors
///
/// Returns an error only when the underlying reader fails.
#[tracing::instrument(skip(reader))]
pub fn load_weather<R: Read>(reader: R) -> Result<WeatherTable> {
    let mut rdr = csv_reader(reader);

    match rdr.headers() {
        Ok(_) => {}
        Err(e) if is_io_error(&e) => return Err(e).context("Failed to read daily weather data"),
        Err(e) => {
            debug!(error = %e, "Unreadable daily weather header");
            return Ok(WeatherTable::default());
        }
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for result in rdr.deserialize::<RawDaily>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if is_io_error(&e) => {
                return Err(e).context("Failed to read daily weather data");
            }
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        match validate_daily(raw) {
            Some(record) if seen.insert(record.date) => records.push(record),
            Some(record) => {
                debug!(date = %record.date, "Duplicate date skipped");
                duplicates += 1;
            }
            None => dropped += 1,
        }
    }

    info!(kept = records.len(), dropped, duplicates, "Daily weather table loaded");
    Ok(WeatherTable::new(records))
}

/// Opens a data file, transparently decompressing `.gz` files.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

pub fn load_trips_from_path(path: &Path) -> Result<TripTable> {
    debug!(path = %path.display(), "Loading trips");
    load_trips(open_source(path)?).with_context(|| format!("Failed to load {}", path.display()))
}

pub fn load_weather_from_path(path: &Path) -> Result<WeatherTable> {
    debug!(path = %path.display(), "Loading daily weather");
    load_weather(open_source(path)?)
        .with_context(|| format!("Failed to load {}", path.display()))
}
