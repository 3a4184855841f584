//! Expansion of a stay into one row per hour spent on site.

use chrono::{Duration, NaiveDate};

use crate::error::StayError;
use crate::occupancy::calendar::parse_hour;
use crate::occupancy::types::{OccupancyHour, StayRecord};

/// The hours of a single stay, from the arrival hour through the departure
/// hour inclusive.
///
/// A clone taken before consumption walks the same hours again.
#[derive(Debug, Clone)]
pub struct StayHours<'a> {
    site_code: &'a str,
    start_date: NaiveDate,
    start_hour: u8,
    offset: usize,
    len: usize,
}

impl Iterator for StayHours<'_> {
    type Item = OccupancyHour;

    fn next(&mut self) -> Option<OccupancyHour> {
        if self.offset >= self.len {
            return None;
        }

        let slot = usize::from(self.start_hour) + self.offset;
        let hour = OccupancyHour {
            date: self.start_date + Duration::days((slot / 24) as i64),
            hour: (slot % 24) as u8,
            site_code: self.site_code.to_string(),
            patients: 1,
            arrivals: u32::from(self.offset == 0),
        };
        self.offset += 1;

        Some(hour)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StayHours<'_> {}

/// Expands `stay` into its occupancy hours.
///
/// The first hour carries `arrivals = 1`; every later hour carries 0.
///
/// # Errors
///
/// Fails if either time has no parsable leading hour, or if the departure
/// hour falls before the arrival hour.
pub fn expand_stay(stay: &StayRecord) -> Result<StayHours<'_>, StayError> {
    let arrival_hour = parse_hour("arrival_time", &stay.arrival_time)?;
    let departure_hour = parse_hour("departure_time", &stay.departure_time)?;

    let days = (stay.departure_date - stay.arrival_date).num_days();
    let total = days * 24 + i64::from(departure_hour) - i64::from(arrival_hour) + 1;

    if total < 1 {
        return Err(StayError::DepartureBeforeArrival {
            arrival: format!("{} {}", stay.arrival_date, stay.arrival_time),
            departure: format!("{} {}", stay.departure_date, stay.departure_time),
        });
    }

    Ok(StayHours {
        site_code: &stay.site_code,
        start_date: stay.arrival_date,
        start_hour: arrival_hour,
        offset: 0,
        len: total as usize,
    })
}
