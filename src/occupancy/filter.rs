//! Removal of weeks that have not fully elapsed.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::occupancy::calendar::week_start;
use crate::occupancy::types::HourlyAggregate;

/// First date excluded from publication when running on `today`.
///
/// This is the Monday one week before the Monday on or before `today`, so the
/// current week and the week before it are both withheld.
pub fn incomplete_week_cutoff(today: NaiveDate) -> NaiveDate {
    // at the start of the representable range nothing is publishable
    week_start(today)
        .checked_sub_days(Days::new(7))
        .unwrap_or(NaiveDate::MIN)
}

/// Keeps only hourly rows dated before [`incomplete_week_cutoff`].
pub fn drop_incomplete_weeks(rows: Vec<HourlyAggregate>, today: NaiveDate) -> Vec<HourlyAggregate> {
    let cutoff = incomplete_week_cutoff(today);
    let before = rows.len();

    let kept: Vec<_> = rows.into_iter().filter(|r| r.date < cutoff).collect();

    debug!(
        %cutoff,
        kept = kept.len(),
        dropped = before - kept.len(),
        "Incomplete weeks removed"
    );
    kept
}
