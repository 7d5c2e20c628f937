use crate::water_year::{water_year_end, water_year_start};
use chrono::NaiveDate;
use std::fmt;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// October 1 through September 30 of the given water year.
    pub fn water_year(water_year: i32) -> Option<DateRange> {
        Some(DateRange(
            water_year_start(water_year)?,
            water_year_end(water_year)?,
        ))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    /// Number of days remaining in the range, zero when start is after end.
    pub fn len_days(&self) -> u64 {
        let days = (self.1 - self.0).num_days();
        if days < 0 {
            0
        } else {
            days as u64 + 1
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0 <= date && date <= self.1
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            // NaiveDate::MAX has no successor; pull the end back so iteration stops
            None => self.1 = current.pred_opt()?,
        }
        Some(current)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.0, self.1)
    }
}
