//! Data types flowing through the occupancy pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One patient's stay at one site, as extracted from the attendance source.
///
/// Times are kept as the raw strings supplied upstream; only their leading
/// two characters (the hour) are ever read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRecord {
    pub site_code: String,
    pub arrival_date: NaiveDate,
    pub arrival_time: String,
    pub departure_date: NaiveDate,
    pub departure_time: String,
}

/// A single hour in which one stay was present on site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyHour {
    pub date: NaiveDate,
    pub hour: u8,
    pub site_code: String,
    /// Always 1.
    pub patients: u32,
    /// 1 for the first hour of the stay, 0 afterwards.
    pub arrivals: u32,
}

/// Occupancy for one (date, hour, site).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyAggregate {
    pub date: NaiveDate,
    pub hour: u8,
    pub site_code: String,
    pub patients: u64,
    pub arrivals: u64,
    pub date_weekstarting: NaiveDate,
    pub date_weekending: NaiveDate,
}

/// Weekly summary for one site. This is the persisted output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub date_weekstarting: NaiveDate,
    pub date_weekending: NaiveDate,
    pub fin_year: String,
    pub month: String,
    pub site_code: String,
    pub patients_mean: f64,
    pub arrivals_mean: f64,
    pub completeness: f64,
}
