//! Load-once handles for the two source tables.
//!
//! Every page reads the same unfiltered tables. They are loaded on first use
//! and never mutated afterwards, so later views reuse the cached copy.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::aggregator::types::{TripTable, WeatherTable};
use crate::loader::{load_trips_from_path, load_weather_from_path};

/// A loaded table together with the warning to show when its source could
/// not be read. A failed load leaves an empty table behind.
#[derive(Debug, Clone, Default)]
pub struct Loaded<T> {
    pub table: T,
    pub warning: Option<String>,
}

impl<T: Default> Loaded<T> {
    fn from_result(path: &Path, result: anyhow::Result<T>) -> Self {
        match result {
            Ok(table) => Loaded {
                table,
                warning: None,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "Data file unavailable");
                Loaded {
                    table: T::default(),
                    warning: Some(format!("Data file not available: {}", path.display())),
                }
            }
        }
    }
}

pub struct DataCache {
    trips_path: PathBuf,
    weather_path: PathBuf,
    trips: OnceCell<Loaded<TripTable>>,
    weather: OnceCell<Loaded<WeatherTable>>,
}

impl DataCache {
    pub fn new(trips_path: impl Into<PathBuf>, weather_path: impl Into<PathBuf>) -> Self {
        Self {
            trips_path: trips_path.into(),
            weather_path: weather_path.into(),
            trips: OnceCell::new(),
            weather: OnceCell::new(),
        }
    }

    pub fn trips(&self) -> &Loaded<TripTable> {
        self.trips.get_or_init(|| {
            Loaded::from_result(&self.trips_path, load_trips_from_path(&self.trips_path))
        })
    }

    pub fn weather(&self) -> &Loaded<WeatherTable> {
        self.weather.get_or_init(|| {
            Loaded::from_result(&self.weather_path, load_weather_from_path(&self.weather_path))
        })
    }
}
