//! Output formatting and persistence for the computed views.
//!
//! Supports printing views as JSON and CSV/JSON export with optional gzip
//! compression.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::aggregator::aggregate::{
    align_daily_series, hourly_distribution, summary, top_stations,
};
use crate::aggregator::types::{HourCount, TripTable, WeatherTable};

/// Prints a view to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_bytes(path: &Path, bytes: Vec<u8>, gzip: bool) -> Result<PathBuf> {
    let (body, target) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        (encoder.finish()?, PathBuf::from(name))
    } else {
        (bytes, path.to_path_buf())
    };

    std::fs::write(&target, body)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    debug!(path = %target.display(), gzip, "File written");
    Ok(target)
}

/// Writes `rows` as a CSV file with a header row. Returns the path written,
/// which gains a `.gz` suffix when compressing.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T], gzip: bool) -> Result<PathBuf> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;

    write_bytes(path, bytes, gzip)
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json(path: &Path, value: &impl Serialize, gzip: bool) -> Result<PathBuf> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, bytes, gzip)
}

/// Exports every view into `out_dir`: the station ranking, the hourly
/// distribution, the aligned daily series and the summary.
#[tracing::instrument(skip(out_dir, trips, weather), fields(out_dir = %out_dir.display()))]
pub fn export_views(
    out_dir: &Path,
    trips: &TripTable,
    weather: &WeatherTable,
    top_n: usize,
    gzip: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let ranking = top_stations(trips, top_n);
    let hourly: Vec<HourCount> = hourly_distribution(trips).iter().collect();
    let daily = align_daily_series(weather);

    let written = vec![
        write_csv(&out_dir.join("stations.csv"), ranking.entries(), gzip)?,
        write_csv(&out_dir.join("hourly.csv"), &hourly, gzip)?,
        write_csv(&out_dir.join("daily.csv"), &daily, gzip)?,
        write_json(&out_dir.join("summary.json"), &summary(trips), gzip)?,
    ];

    info!(files = written.len(), "Export complete");
    Ok(written)
}
