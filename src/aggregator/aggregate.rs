use crate::aggregator::season::{RiderType, Season};
use crate::aggregator::types::{
    DailyPoint, DailySeriesStats, HourlyDistribution, StationCount, StationRanking, Summary,
    TripRecord, TripTable, WeatherTable,
};
use crate::aggregator::utility::{mean, pearson};
use chrono::Timelike;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// Number of stations shown on the popular-stations page.
pub const DEFAULT_TOP_N: usize = 20;

/// Groups trips by `key`, counts each group and returns the `n` largest groups.
///
/// Groups are ordered by descending count; equal counts keep the order in
/// which the group was first seen in the table.
pub fn top_n<F>(table: &TripTable, key: F, n: usize) -> StationRanking
where
    F: for<'a> Fn(&'a TripRecord) -> &'a str,
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for record in &table.records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }

    let mut entries: Vec<StationCount> = counts
        .into_iter()
        .map(|(name, trip_count)| StationCount {
            station_name: name.to_string(),
            trip_count,
        })
        .collect();

    // stable: ties stay in first-seen order
    entries.sort_by(|a, b| b.trip_count.cmp(&a.trip_count));
    entries.truncate(n);

    StationRanking { entries }
}

/// The `n` busiest start stations.
pub fn top_stations(table: &TripTable, n: usize) -> StationRanking {
    top_n(table, |r| r.start_station_name.as_str(), n)
}

/// Keeps trips that started in one of `seasons`. An empty selection keeps nothing.
pub fn filter_by_season(table: &TripTable, seasons: &[Season]) -> TripTable {
    TripTable::new(
        table
            .records
            .iter()
            .filter(|r| seasons.contains(&r.season()))
            .cloned()
            .collect(),
    )
}

/// Keeps trips whose rider type is one of `types`. Trips with an unknown rider
/// type never match.
pub fn filter_by_rider_type(table: &TripTable, types: &[RiderType]) -> TripTable {
    TripTable::new(
        table
            .records
            .iter()
            .filter(|r| r.rider_type.is_some_and(|t| types.contains(&t)))
            .cloned()
            .collect(),
    )
}

/// Counts trips per hour of day.
pub fn hourly_distribution(table: &TripTable) -> HourlyDistribution {
    let mut counts = BTreeMap::new();
    for record in &table.records {
        *counts.entry(record.started_at.hour()).or_insert(0) += 1;
    }
    HourlyDistribution { counts }
}

/// Daily rides and temperature sorted by date. Missing dates stay missing.
pub fn align_daily_series(table: &WeatherTable) -> Vec<DailyPoint> {
    let mut series: Vec<DailyPoint> = table
        .records
        .iter()
        .map(|r| DailyPoint {
            date: r.date,
            trip_count: r.trip_count,
            avg_temperature: r.avg_temperature,
        })
        .collect();
    series.sort_by_key(|p| p.date);
    series
}

pub fn daily_series_stats(series: &[DailyPoint]) -> DailySeriesStats {
    let trips: Vec<f64> = series.iter().map(|p| p.trip_count as f64).collect();
    let temps: Vec<f64> = series.iter().map(|p| p.avg_temperature).collect();

    DailySeriesStats {
        days: series.len(),
        total_trips: series
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.trip_count)),
        mean_trips: mean(&trips),
        mean_temperature: mean(&temps),
        correlation: pearson(&trips, &temps),
    }
}

/// Total trip count and the single busiest start station.
pub fn summary(table: &TripTable) -> Summary {
    Summary {
        total_count: table.len(),
        top_station_name: top_stations(table, 1)
            .entries
            .into_iter()
            .next()
            .map(|s| s.station_name),
    }
}

/// Seasons that occur in the table, in calendar order.
pub fn available_seasons(table: &TripTable) -> Vec<Season> {
    let present: BTreeSet<Season> = table.records.iter().map(TripRecord::season).collect();
    present.into_iter().collect()
}

/// Rider types that occur in the table.
pub fn available_rider_types(table: &TripTable) -> Vec<RiderType> {
    let present: BTreeSet<RiderType> = table.records.iter().filter_map(|r| r.rider_type).collect();
    present.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::types::DailyWeatherRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(month: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, month, 10)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn trip(station: &str, month: u32, hour: u32, rider: Option<RiderType>) -> TripRecord {
        TripRecord {
            started_at: ts(month, hour),
            start_station_name: station.to_string(),
            rider_type: rider,
        }
    }

    fn scenario_table() -> TripTable {
        TripTable::new(vec![
            trip("A", 1, 8, Some(RiderType::Member)),
            trip("B", 1, 8, Some(RiderType::Casual)),
            trip("A", 7, 9, Some(RiderType::Member)),
        ])
    }

    fn day(d: u32, trips: u64, temp: f64) -> DailyWeatherRecord {
        DailyWeatherRecord {
            date: NaiveDate::from_ymd_opt(2022, 1, d).unwrap(),
            trip_count: trips,
            avg_temperature: temp,
        }
    }

    #[test]
    fn test_top_stations_scenario() {
        let ranking = top_stations(&scenario_table(), 1);
        assert_eq!(
            ranking.entries(),
            &[StationCount {
                station_name: "A".to_string(),
                trip_count: 2
            }]
        );
    }

    #[test]
    fn test_top_stations_fewer_groups_than_n() {
        let ranking = top_stations(&scenario_table(), 20);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.entries()[1].station_name, "B");
    }

    #[test]
    fn test_top_stations_zero() {
        assert!(top_stations(&scenario_table(), 0).is_empty());
    }

    #[test]
    fn test_top_stations_ties_keep_first_seen_order() {
        let table = TripTable::new(vec![
            trip("Zeta", 1, 8, None),
            trip("Alpha", 1, 8, None),
            trip("Mid", 1, 8, None),
            trip("Mid", 1, 9, None),
        ]);
        let names: Vec<_> = top_stations(&table, 3)
            .entries()
            .iter()
            .map(|s| s.station_name.clone())
            .collect();
        assert_eq!(names, vec!["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_filter_by_season() {
        let table = scenario_table();
        assert!(filter_by_season(&table, &[]).is_empty());
        assert_eq!(filter_by_season(&table, &Season::ALL), table);

        let summer = filter_by_season(&table, &[Season::Summer]);
        assert_eq!(summer.len(), 1);
        assert_eq!(summer.records()[0].started_at.hour(), 9);
    }

    #[test]
    fn test_filter_by_rider_type() {
        let mut records = scenario_table().records;
        records.push(trip("C", 3, 17, None));
        let table = TripTable::new(records);

        assert!(filter_by_rider_type(&table, &[]).is_empty());
        assert_eq!(filter_by_rider_type(&table, &[RiderType::Member]).len(), 2);
        // the unlabeled trip never matches
        assert_eq!(filter_by_rider_type(&table, &RiderType::ALL).len(), 3);
    }

    #[test]
    fn test_hourly_distribution_scenario() {
        let dist = hourly_distribution(&scenario_table());
        assert_eq!(dist.get(8), Some(2));
        assert_eq!(dist.get(9), Some(1));
        assert_eq!(dist.get(10), None);

        let peak = dist.peak().unwrap();
        assert_eq!((peak.hour, peak.trip_count), (8, 2));
    }

    #[test]
    fn test_hourly_peak_tie_goes_to_earliest_hour() {
        let table = TripTable::new(vec![
            trip("A", 1, 17, None),
            trip("A", 1, 7, None),
            trip("A", 1, 17, None),
            trip("A", 1, 7, None),
        ]);
        assert_eq!(hourly_distribution(&table).peak().unwrap().hour, 7);
    }

    #[test]
    fn test_hourly_distribution_empty() {
        let dist = hourly_distribution(&TripTable::default());
        assert!(dist.is_empty());
        assert!(dist.peak().is_none());
    }

    #[test]
    fn test_align_daily_series_keeps_gaps() {
        let table = WeatherTable::new(vec![day(3, 150, 6.0), day(1, 100, 5.0)]);
        let series = align_daily_series(&table);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(series[0].trip_count, 100);
        assert_eq!(series[1].date, NaiveDate::from_ymd_opt(2022, 1, 3).unwrap());
        assert_eq!(series[1].avg_temperature, 6.0);
    }

    #[test]
    fn test_daily_series_stats() {
        let table = WeatherTable::new(vec![day(1, 100, 5.0), day(2, 200, 10.0), day(3, 300, 15.0)]);
        let stats = daily_series_stats(&align_daily_series(&table));

        assert_eq!(stats.days, 3);
        assert_eq!(stats.total_trips, 600);
        assert_eq!(stats.mean_trips, 200.0);
        assert_eq!(stats.mean_temperature, 10.0);
        assert!((stats.correlation.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_daily_series_stats_total_saturates() {
        let table = WeatherTable::new(vec![day(1, u64::MAX, 1.0), day(2, 5, 2.0)]);
        let stats = daily_series_stats(&align_daily_series(&table));

        assert_eq!(stats.days, 2);
        assert_eq!(stats.total_trips, u64::MAX);
    }

    #[test]
    fn test_daily_series_stats_empty() {
        let stats = daily_series_stats(&[]);
        assert_eq!(stats.days, 0);
        assert_eq!(stats.correlation, None);
    }

    #[test]
    fn test_summary() {
        let s = summary(&scenario_table());
        assert_eq!(s.total_count, 3);
        assert_eq!(s.top_station_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_summary_empty() {
        let s = summary(&TripTable::default());
        assert_eq!(s.total_count, 0);
        assert_eq!(s.top_station_name, None);
    }

    #[test]
    fn test_available_values() {
        let table = scenario_table();
        assert_eq!(available_seasons(&table), vec![Season::Winter, Season::Summer]);
        assert_eq!(
            available_rider_types(&table),
            vec![RiderType::Member, RiderType::Casual]
        );
    }
}
