pub mod aggregator;
pub mod cache;
pub mod config;
pub mod loader;
pub mod map;
pub mod output;
pub mod report;
