//! Grouping of occupancy hours into per-site hourly counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::occupancy::calendar::{week_end, week_start};
use crate::occupancy::types::{HourlyAggregate, OccupancyHour};

type HourKey = (NaiveDate, u8, String);

/// Running (date, hour, site) totals that occupancy hours are folded into as
/// they are produced, so memory follows the number of distinct keys rather
/// than the number of hours.
#[derive(Debug, Default)]
pub struct HourlyGrid {
    groups: BTreeMap<HourKey, (u64, u64)>,
    occupancy_hours: usize,
}

impl HourlyGrid {
    pub fn add(&mut self, h: OccupancyHour) {
        self.occupancy_hours += 1;
        let totals = self.groups.entry((h.date, h.hour, h.site_code)).or_default();
        totals.0 += 1;
        totals.1 += u64::from(h.arrivals);
    }

    /// Occupancy hours folded in so far.
    pub fn occupancy_hours(&self) -> usize {
        self.occupancy_hours
    }

    /// Grouped rows ordered by date, hour, then site code.
    pub fn into_rows(self) -> Vec<HourlyAggregate> {
        let input_rows = self.occupancy_hours;
        let rows = into_rows(self.groups);
        debug!(input_rows, output_rows = rows.len(), "Hourly aggregation complete");
        rows
    }
}

impl Extend<OccupancyHour> for HourlyGrid {
    fn extend<I: IntoIterator<Item = OccupancyHour>>(&mut self, hours: I) {
        for h in hours {
            self.add(h);
        }
    }
}

/// Groups occupancy hours by (date, hour, site).
///
/// `patients` counts the rows in each group and `arrivals` sums their arrival
/// flags. Rows come back ordered by date, hour, then site code.
pub fn aggregate_hourly<I>(hours: I) -> Vec<HourlyAggregate>
where
    I: IntoIterator<Item = OccupancyHour>,
{
    let mut grid = HourlyGrid::default();
    grid.extend(hours);
    grid.into_rows()
}

/// Merges hourly aggregates that share a (date, hour, site) key by summing
/// their counts.
///
/// Partial aggregates built from disjoint slices of the stays recombine into
/// the aggregate of the whole; already grouped input is returned unchanged.
pub fn regroup_hourly<I>(rows: I) -> Vec<HourlyAggregate>
where
    I: IntoIterator<Item = HourlyAggregate>,
{
    let mut groups: BTreeMap<HourKey, (u64, u64)> = BTreeMap::new();

    for row in rows {
        let totals = groups.entry((row.date, row.hour, row.site_code)).or_default();
        totals.0 += row.patients;
        totals.1 += row.arrivals;
    }

    into_rows(groups)
}

fn into_rows(groups: BTreeMap<HourKey, (u64, u64)>) -> Vec<HourlyAggregate> {
    groups
        .into_iter()
        .map(|((date, hour, site_code), (patients, arrivals))| HourlyAggregate {
            date,
            hour,
            site_code,
            patients,
            arrivals,
            date_weekstarting: week_start(date),
            date_weekending: week_end(date),
        })
        .collect()
}
