//! Input locations, read from the environment (and `.env`) with CLI overrides.

use std::path::PathBuf;

pub const DEFAULT_TRIPS_CSV: &str = "reduced_data_to_plot_7.csv";
pub const DEFAULT_DAILY_CSV: &str = "reduced_data_to_plot_merged.csv";
pub const DEFAULT_MAP_HTML: &str = "NYC_BikeTrips_Kepler.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub trips_path: PathBuf,
    pub daily_path: PathBuf,
    pub map_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trips_path: PathBuf::from(DEFAULT_TRIPS_CSV),
            daily_path: PathBuf::from(DEFAULT_DAILY_CSV),
            map_path: PathBuf::from(DEFAULT_MAP_HTML),
        }
    }
}

impl DashboardConfig {
    /// Reads `TRIPS_CSV`, `DAILY_CSV` and `MAP_HTML`, falling back to the
    /// default file names in the working directory.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        Self {
            trips_path: path("TRIPS_CSV", defaults.trips_path),
            daily_path: path("DAILY_CSV", defaults.daily_path),
            map_path: path("MAP_HTML", defaults.map_path),
        }
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        trips: Option<PathBuf>,
        daily: Option<PathBuf>,
        map: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = trips {
            self.trips_path = p;
        }
        if let Some(p) = daily {
            self.daily_path = p;
        }
        if let Some(p) = map {
            self.map_path = p;
        }
        self
    }
}
