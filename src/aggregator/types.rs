//! Data types shared by the loader, the aggregation functions and the reports.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregator::season::{RiderType, Season};

/// A single validated trip. Rows without a start timestamp or start station
/// never make it into this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub started_at: NaiveDateTime,
    pub start_station_name: String,
    pub rider_type: Option<RiderType>,
}

impl TripRecord {
    pub fn season(&self) -> Season {
        Season::of(&self.started_at)
    }
}

/// Validated trip rows in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripTable {
    pub(crate) records: Vec<TripRecord>,
}

impl TripTable {
    pub fn new(records: Vec<TripRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One day of the merged rides + weather file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyWeatherRecord {
    pub date: NaiveDate,
    pub trip_count: u64,
    pub avg_temperature: f64,
}

/// Validated daily rows, at most one per calendar date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherTable {
    pub(crate) records: Vec<DailyWeatherRecord>,
}

impl WeatherTable {
    pub fn new(records: Vec<DailyWeatherRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DailyWeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A station and the number of trips that started there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationCount {
    pub station_name: String,
    pub trip_count: usize,
}

/// Stations ordered by descending trip count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StationRanking {
    pub(crate) entries: Vec<StationCount>,
}

impl StationRanking {
    pub fn entries(&self) -> &[StationCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&StationCount> {
        self.entries.first()
    }
}

/// A single bucket of the hourly distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub trip_count: usize,
}

/// Trip counts per hour of day. Only hours that occur in the input are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HourlyDistribution {
    pub(crate) counts: BTreeMap<u32, usize>,
}

impl HourlyDistribution {
    pub fn get(&self, hour: u32) -> Option<usize> {
        self.counts.get(&hour).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Buckets in ascending hour order.
    pub fn iter(&self) -> impl Iterator<Item = HourCount> + '_ {
        self.counts.iter().map(|(&hour, &trip_count)| HourCount { hour, trip_count })
    }

    /// The busiest hour. Ties go to the earliest hour; `None` when empty.
    pub fn peak(&self) -> Option<HourCount> {
        let mut best: Option<HourCount> = None;
        for bucket in self.iter() {
            match best {
                Some(b) if bucket.trip_count <= b.trip_count => {}
                _ => best = Some(bucket),
            }
        }
        best
    }
}

/// A row of the date-aligned rides/temperature series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub trip_count: u64,
    pub avg_temperature: f64,
}

/// Descriptive statistics over the aligned daily series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesStats {
    pub days: usize,
    pub total_trips: u64,
    pub mean_trips: f64,
    pub mean_temperature: f64,
    /// Pearson correlation between rides and temperature. Absent for fewer
    /// than two days or when either series is constant.
    pub correlation: Option<f64>,
}

/// Headline numbers for the recommendations page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub top_station_name: Option<String>,
}
