//! Hourly and weekly occupancy from patient stays.
//!
//! Each stay is expanded into one row per hour on site, grouped into
//! per-site hourly counts, trimmed to weeks that have fully elapsed, and
//! summarised per site and week as mean occupancy, mean arrivals and
//! completeness.
//!
//! Completeness counts the hours in which any stay was present. An hour with
//! nobody on site is indistinguishable from an hour with missing data.

pub mod calendar;
pub mod expand;
pub mod filter;
pub mod hourly;
pub mod pipeline;
pub mod types;
pub mod weekly;

pub use pipeline::{hourly_occupancy, summarise_stays};
pub use types::{HourlyAggregate, OccupancyHour, StayRecord, WeeklyAggregate};
