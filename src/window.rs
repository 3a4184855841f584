//! The lookback window that bounds which stays are extracted.
//!
//! Written as a bare day count (`"90"`) or as a count and unit
//! (`"12 weeks"`, `"6 months"`, `"1 year"`).

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};

use crate::error::ConfigError;
use crate::occupancy::calendar::week_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
}

impl DateWindow {
    /// Parses a window specification.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedWindow`] unless the input is a positive count,
    /// optionally followed by a single space and a unit;
    /// [`ConfigError::UnsupportedUnit`] for any unit other than day, week,
    /// month or year (singular or plural).
    pub fn parse(window: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedWindow(window.to_string());

        if let Ok(days) = window.parse::<u32>() {
            return positive(days).map(DateWindow::Days).ok_or_else(malformed);
        }

        let parts: Vec<&str> = window.split(' ').collect();
        let [count, unit] = parts.as_slice() else {
            return Err(malformed());
        };

        let unit = unit.strip_suffix('s').unwrap_or(*unit);
        let build: fn(u32) -> DateWindow = match unit {
            "day" => DateWindow::Days,
            "week" => DateWindow::Weeks,
            "month" => DateWindow::Months,
            "year" => DateWindow::Years,
            _ => {
                return Err(ConfigError::UnsupportedUnit {
                    window: window.to_string(),
                    unit: unit.to_string(),
                });
            }
        };

        count
            .parse::<u32>()
            .ok()
            .and_then(positive)
            .map(build)
            .ok_or_else(malformed)
    }

    /// First date covered by a window that ends on `end`.
    ///
    /// Day and week windows include `end` itself; month and year windows step
    /// back whole calendar months, clamping to the end of a shorter month.
    pub fn start_date(&self, end: NaiveDate) -> NaiveDate {
        let start = match *self {
            DateWindow::Days(n) => end.checked_sub_signed(Duration::days(i64::from(n) - 1)),
            DateWindow::Weeks(n) => end.checked_sub_signed(Duration::days(i64::from(n) * 7 - 1)),
            DateWindow::Months(n) => end.checked_sub_months(Months::new(n)),
            DateWindow::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
        };
        start.unwrap_or(NaiveDate::MIN)
    }

    /// [`start_date`](Self::start_date) moved back to its Monday, so the
    /// extraction always begins on a whole week.
    pub fn week_start(&self, end: NaiveDate) -> NaiveDate {
        week_start(self.start_date(end))
    }
}

fn positive(n: u32) -> Option<u32> {
    (n > 0).then_some(n)
}

impl FromStr for DateWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateWindow::parse(s)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindow::Days(n) => write!(f, "{n} days"),
            DateWindow::Weeks(n) => write!(f, "{n} weeks"),
            DateWindow::Months(n) => write!(f, "{n} months"),
            DateWindow::Years(n) => write!(f, "{n} years"),
        }
    }
}
