//! Weekly per-site summaries built from the hourly grid.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::occupancy::calendar::{HOURS_PER_WEEK, fin_year_label, month_label};
use crate::occupancy::types::{HourlyAggregate, WeeklyAggregate};

#[derive(Debug, Default)]
struct WeekTotals {
    patients: u64,
    arrivals: u64,
    hours_observed: u64,
}

/// Mean per hour of the whole week, not per observed hour.
pub fn per_week_hour(total: u64) -> f64 {
    total as f64 / f64::from(HOURS_PER_WEEK)
}

/// Groups hourly aggregates by (week start, week end, site).
///
/// Expects one row per (date, hour, site), as produced by
/// [`aggregate_hourly`](crate::occupancy::hourly::aggregate_hourly); each row
/// then counts as one observed hour toward `completeness`.
pub fn aggregate_weekly(rows: &[HourlyAggregate]) -> Vec<WeeklyAggregate> {
    let mut weeks: BTreeMap<(NaiveDate, NaiveDate, &str), WeekTotals> = BTreeMap::new();

    for row in rows {
        let totals = weeks
            .entry((row.date_weekstarting, row.date_weekending, row.site_code.as_str()))
            .or_default();
        totals.patients += row.patients;
        totals.arrivals += row.arrivals;
        totals.hours_observed += 1;
    }

    let summaries: Vec<_> = weeks
        .into_iter()
        .map(|((start, end, site_code), totals)| WeeklyAggregate {
            date_weekstarting: start,
            date_weekending: end,
            fin_year: fin_year_label(start),
            month: month_label(start),
            site_code: site_code.to_string(),
            patients_mean: per_week_hour(totals.patients),
            arrivals_mean: per_week_hour(totals.arrivals),
            completeness: per_week_hour(totals.hours_observed),
        })
        .collect();

    debug!(
        hourly_rows = rows.len(),
        weekly_rows = summaries.len(),
        "Weekly aggregation complete"
    );
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::calendar::{week_end, week_start};
    use chrono::Duration;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn hourly(date: NaiveDate, hour: u8, site: &str, patients: u64, arrivals: u64) -> HourlyAggregate {
        HourlyAggregate {
            date,
            hour,
            site_code: site.to_string(),
            patients,
            arrivals,
            date_weekstarting: week_start(date),
            date_weekending: week_end(date),
        }
    }

    /// Every hour of the week starting `monday`, `count` of them.
    fn hours_of_week(monday: NaiveDate, count: usize, site: &str) -> Vec<HourlyAggregate> {
        (0..count)
            .map(|i| hourly(monday + Duration::days((i / 24) as i64), (i % 24) as u8, site, 2, 1))
            .collect()
    }

    #[test]
    fn test_full_week_is_complete() {
        let rows = hours_of_week(d(2024, 1, 1), 168, "S1");
        let weeks = aggregate_weekly(&rows);

        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].completeness, 1.0);
        assert_eq!(weeks[0].patients_mean, 2.0);
        assert_eq!(weeks[0].arrivals_mean, 1.0);
    }

    #[test]
    fn test_half_week_completeness() {
        let rows = hours_of_week(d(2024, 1, 1), 84, "S1");
        let weeks = aggregate_weekly(&rows);

        assert_eq!(weeks[0].completeness, 0.5);
        // means divide by the whole week, not by observed hours
        assert_eq!(weeks[0].patients_mean, 1.0);
        assert_eq!(weeks[0].arrivals_mean, 0.5);
    }

    #[test]
    fn test_labels_and_bounds() {
        let rows = vec![hourly(d(2024, 4, 3), 10, "S1", 3, 1)];
        let week = &aggregate_weekly(&rows)[0];

        assert_eq!(week.date_weekstarting, d(2024, 4, 1));
        assert_eq!(week.date_weekending, d(2024, 4, 7));
        assert_eq!(week.fin_year, "2024-25");
        assert_eq!(week.month, "Apr");
        assert_eq!(week.site_code, "S1");
        assert_eq!(week.patients_mean, 3.0 / 168.0);
        assert_eq!(week.completeness, 1.0 / 168.0);
    }

    #[test]
    fn test_labels_follow_week_start_not_row_date() {
        // 2023-04-02 is a Sunday; its week started in March of 2022-23
        let rows = vec![hourly(d(2023, 4, 2), 0, "S1", 1, 1)];
        let week = &aggregate_weekly(&rows)[0];
        assert_eq!(week.date_weekstarting, d(2023, 3, 27));
        assert_eq!(week.month, "Mar");
        assert_eq!(week.fin_year, "2022-23");
    }

    #[test]
    fn test_groups_by_site_and_week() {
        let mut rows = hours_of_week(d(2024, 1, 1), 24, "S1");
        rows.extend(hours_of_week(d(2024, 1, 1), 48, "S2"));
        rows.extend(hours_of_week(d(2024, 1, 8), 12, "S1"));

        let weeks = aggregate_weekly(&rows);
        let keys: Vec<_> = weeks
            .iter()
            .map(|w| (w.date_weekstarting, w.site_code.as_str(), w.completeness))
            .collect();

        assert_eq!(
            keys,
            vec![
                (d(2024, 1, 1), "S1", 24.0 / 168.0),
                (d(2024, 1, 1), "S2", 48.0 / 168.0),
                (d(2024, 1, 8), "S1", 12.0 / 168.0),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_completeness_within_unit_interval(
            hours in proptest::collection::btree_set(0usize..168, 0..168),
            patients in 1u64..20,
        ) {
            let monday = d(2024, 5, 6);
            let rows: Vec<_> = hours
                .iter()
                .map(|&i| hourly(monday + Duration::days((i / 24) as i64), (i % 24) as u8, "S1", patients, 0))
                .collect();

            for week in aggregate_weekly(&rows) {
                prop_assert!((0.0..=1.0).contains(&week.completeness));
                prop_assert!(week.patients_mean >= 0.0);
                prop_assert!(week.arrivals_mean >= 0.0);
            }
        }
    }
}
