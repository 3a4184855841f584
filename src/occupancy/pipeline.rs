//! End-to-end batch transform from stay records to weekly summaries.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{Error, Result};
use crate::occupancy::expand::expand_stay;
use crate::occupancy::filter::drop_incomplete_weeks;
use crate::occupancy::hourly::HourlyGrid;
use crate::occupancy::types::{HourlyAggregate, StayRecord, WeeklyAggregate};
use crate::occupancy::weekly::aggregate_weekly;

/// Expands every stay straight into an [`HourlyGrid`], stopping at the first
/// invalid record. Occupancy hours are never held in memory all at once.
pub fn expand_into_grid(stays: &[StayRecord]) -> Result<HourlyGrid> {
    let mut grid = HourlyGrid::default();

    for (index, stay) in stays.iter().enumerate() {
        let expanded = expand_stay(stay).map_err(|source| Error::InvalidStay {
            index,
            site_code: stay.site_code.clone(),
            source,
        })?;
        grid.extend(expanded);
    }

    Ok(grid)
}

/// Hourly occupancy grid for `stays`, with weeks that have not fully elapsed
/// by `today` removed.
#[tracing::instrument(skip_all, fields(stays = stays.len(), %today))]
pub fn hourly_occupancy(stays: &[StayRecord], today: NaiveDate) -> Result<Vec<HourlyAggregate>> {
    let grid = expand_into_grid(stays)?;
    info!(occupancy_hours = grid.occupancy_hours(), "Stays expanded");

    Ok(drop_incomplete_weeks(grid.into_rows(), today))
}

/// Runs the whole transform: expansion, hourly grouping, incomplete-week
/// removal and weekly summarising.
#[tracing::instrument(skip_all, fields(stays = stays.len(), %today))]
pub fn summarise_stays(stays: &[StayRecord], today: NaiveDate) -> Result<Vec<WeeklyAggregate>> {
    let hourly = hourly_occupancy(stays, today)?;
    let weekly = aggregate_weekly(&hourly);

    info!(
        hourly_rows = hourly.len(),
        weekly_rows = weekly.len(),
        "Occupancy summarised"
    );
    Ok(weekly)
}
