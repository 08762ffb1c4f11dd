//! Closed classifications derived from trip rows: calendar season and rider type.

use chrono::{Datelike, NaiveDateTime};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Meteorological season of the northern hemisphere.
///
/// | Months        | Season |
/// |---------------|--------|
/// | Dec, Jan, Feb | Winter |
/// | Mar, Apr, May | Spring |
/// | Jun, Jul, Aug | Summer |
/// | Sep, Oct, Nov | Autumn |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum,
)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    /// Maps a calendar month (1-12) to its season.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            _ => None,
        }
    }

    /// Season a trip started in.
    pub fn of(timestamp: &NaiveDateTime) -> Season {
        // chrono months are always 1-12
        Season::from_month(timestamp.month()).unwrap_or(Season::Autumn)
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the renter holds an annual membership or paid per ride.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RiderType {
    Member,
    Casual,
}

impl RiderType {
    pub const ALL: [RiderType; 2] = [RiderType::Member, RiderType::Casual];

    /// Parses a `member_casual` cell. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<RiderType> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("member") {
            Some(RiderType::Member)
        } else if label.eq_ignore_ascii_case("casual") {
            Some(RiderType::Casual)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiderType::Member => "member",
            RiderType::Casual => "casual",
        }
    }
}

impl fmt::Display for RiderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
