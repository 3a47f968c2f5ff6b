use core::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;

use crate::time::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the week must not end ({end}) before it starts ({start})")]
pub struct InvalidDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// An inclusive range of calendar days, `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if start > end {
            return Err(InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Iterates over every day in the range, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// Returns the first day in the range that falls on the given weekday.
    #[must_use]
    pub fn first(&self, week_day: Weekday) -> Option<NaiveDate> {
        self.days().find(|day| day.weekday() == week_day)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", format_date(self.start), format_date(self.end))
    }
}
