//! Week boundaries, financial-year labels and hour parsing.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::StayError;

/// Hours in a Monday-to-Sunday week; the denominator for every weekly mean.
pub const HOURS_PER_WEEK: u32 = 168;

/// Returns the Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = Days::new(u64::from(date.weekday().num_days_from_monday()));
    // only fails at the very start of the representable range
    date.checked_sub_days(offset).unwrap_or(date)
}

/// Returns the Sunday on or after `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    // saturates at the very end of the representable range
    week_start(date)
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX)
}

/// Labels the UK financial year (April to March) containing `date`, e.g. `"2023-24"`.
pub fn fin_year_label(date: NaiveDate) -> String {
    let start_year = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}

/// Three-letter English month name, e.g. `"Jan"`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

/// Reads the hour from the first two characters of a time string such as `"08:45:00"`.
///
/// # Errors
///
/// Returns [`StayError::InvalidHour`] when those characters are missing, are not
/// both digits, or name an hour outside 0..=23.
pub fn parse_hour(field: &'static str, value: &str) -> Result<u8, StayError> {
    let invalid = || StayError::InvalidHour {
        field,
        value: value.to_string(),
    };

    let digits = value.get(..2).ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match digits.parse::<u8>() {
        Ok(hour) if hour <= 23 => Ok(hour),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-03-18 is a Monday
        assert_eq!(week_start(d(2024, 3, 18)), d(2024, 3, 18));
        assert_eq!(week_start(d(2024, 3, 20)), d(2024, 3, 18));
        assert_eq!(week_start(d(2024, 3, 24)), d(2024, 3, 18));
        assert_eq!(week_start(d(2024, 3, 25)), d(2024, 3, 25));
    }

    #[test]
    fn test_week_end_is_sunday() {
        assert_eq!(week_end(d(2024, 3, 18)), d(2024, 3, 24));
        assert_eq!(week_end(d(2024, 3, 24)), d(2024, 3, 24));
        // crosses a year boundary
        assert_eq!(week_start(d(2025, 1, 1)), d(2024, 12, 30));
        assert_eq!(week_end(d(2025, 1, 1)), d(2025, 1, 5));
    }

    #[test]
    fn test_week_bounds_at_range_ends() {
        assert_eq!(week_end(NaiveDate::MAX), NaiveDate::MAX);
        assert!(week_start(NaiveDate::MIN) < week_end(NaiveDate::MIN));
    }

    #[test]
    fn test_fin_year_boundaries() {
        assert_eq!(fin_year_label(d(2024, 3, 31)), "2023-24");
        assert_eq!(fin_year_label(d(2024, 4, 1)), "2024-25");
        assert_eq!(fin_year_label(d(2024, 1, 1)), "2023-24");
        assert_eq!(fin_year_label(d(2024, 12, 31)), "2024-25");
    }

    #[test]
    fn test_fin_year_pads_and_wraps_century() {
        assert_eq!(fin_year_label(d(2008, 6, 2)), "2008-09");
        assert_eq!(fin_year_label(d(1999, 5, 1)), "1999-00");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(d(2024, 1, 1)), "Jan");
        assert_eq!(month_label(d(2024, 9, 30)), "Sep");
        assert_eq!(month_label(d(2024, 12, 2)), "Dec");
    }

    #[test]
    fn test_parse_hour_accepts_leading_two_digits() {
        assert_eq!(parse_hour("arrival_time", "00:00"), Ok(0));
        assert_eq!(parse_hour("arrival_time", "08:59:59"), Ok(8));
        assert_eq!(parse_hour("arrival_time", "23:15"), Ok(23));
        assert_eq!(parse_hour("arrival_time", "17"), Ok(17));
    }

    #[test]
    fn test_parse_hour_rejects_malformed() {
        for bad in ["", "8", "8:00", "24:00", "ab:00", "+8:00", " 8:00", "é:00"] {
            assert_eq!(
                parse_hour("departure_time", bad),
                Err(StayError::InvalidHour {
                    field: "departure_time",
                    value: bad.to_string(),
                }),
                "{bad:?} should be rejected"
            );
        }
    }
}
