//! Trip aggregation and ranking.
//!
//! Every view of the dashboard is computed here from an immutable, validated
//! table: station rankings, hourly demand, the date-aligned weather series and
//! the headline summary.

pub mod aggregate;
pub mod season;
pub mod types;
pub mod utility;
