//! Supply of stay records to the pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::occupancy::StayRecord;

/// The slice of stays a run asks its source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Earliest arrival date extracted; always a Monday.
    pub week_start: NaiveDate,
    /// Departures after this date are treated as bad data and left out.
    pub now: NaiveDate,
    /// Empty means every site.
    pub sites: Vec<String>,
}

impl Extraction {
    pub fn new(settings: &Settings, now: NaiveDate) -> Self {
        Self {
            week_start: settings.window.week_start(now),
            now,
            sites: settings.sites.clone(),
        }
    }

    fn wants_site(&self, site_code: &str) -> bool {
        self.sites.is_empty() || self.sites.iter().any(|s| s == site_code)
    }
}

/// Something that can hand the pipeline a batch of stays.
///
/// Implementations return only stays that arrived on or after
/// `extraction.week_start`, departed on or before `extraction.now`, and
/// belong to one of `extraction.sites`.
pub trait StaySource {
    fn fetch(&self, extraction: &Extraction) -> Result<Vec<StayRecord>>;
}

/// Reads stays from a CSV export with the columns
/// `site_code,arrival_date,arrival_time,departure_date,departure_time`.
pub struct CsvStaySource {
    path: PathBuf,
}

impl CsvStaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct StayRow {
    site_code: String,
    arrival_date: String,
    arrival_time: String,
    departure_date: String,
    departure_time: String,
}

impl StaySource for CsvStaySource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn fetch(&self, extraction: &Extraction) -> Result<Vec<StayRecord>> {
        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening stay export {}", self.path.display()))?;

        let mut stays = Vec::new();
        let mut future_departures = 0usize;
        let mut out_of_scope = 0usize;

        for (line, result) in rdr.deserialize::<StayRow>().enumerate() {
            // header is line 1
            let line = line + 2;
            let row = result.with_context(|| format!("reading line {line}"))?;

            let stay = StayRecord {
                arrival_date: parse_export_date(&row.arrival_date)
                    .with_context(|| format!("arrival_date on line {line}"))?,
                departure_date: parse_export_date(&row.departure_date)
                    .with_context(|| format!("departure_date on line {line}"))?,
                site_code: row.site_code,
                arrival_time: row.arrival_time,
                departure_time: row.departure_time,
            };

            if stay.departure_date > extraction.now {
                future_departures += 1;
            } else if stay.arrival_date < extraction.week_start
                || !extraction.wants_site(&stay.site_code)
            {
                out_of_scope += 1;
            } else {
                stays.push(stay);
            }
        }

        if future_departures > 0 {
            warn!(future_departures, "Dropped stays departing in the future");
        }
        info!(stays = stays.len(), out_of_scope, "Stays loaded");

        Ok(stays)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time of day.
fn parse_export_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.date());
        }
    }

    Err(anyhow!("unrecognised date {value:?}"))
}
