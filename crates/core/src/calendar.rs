//! Month calendar of booked and free days for the booking bot.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::booking::{intervals_overlap, Reserved};
use crate::error::CoreError;

/// Error message for an unparseable or out-of-range month/year.
pub const INVALID_MONTH_MESSAGE: &str = "Invalid month or year format";

/// One calendar month, `[first_day, last_day]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation(INVALID_MONTH_MESSAGE.to_string());

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let last_day = next_first.pred_opt().ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            first_day,
            last_day,
        })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let last_day = first_day
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self {
            year: date.year(),
            month: date.month(),
            first_day,
            last_day,
        }
    }

    /// Parse optional `month`/`year` query values, defaulting to the month
    /// containing `today` when both are absent.
    pub fn from_query(
        month: Option<&str>,
        year: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation(INVALID_MONTH_MESSAGE.to_string());

        match (month, year) {
            (Some(month), Some(year)) => {
                let month: u32 = month.trim().parse().map_err(|_| invalid())?;
                let year: i32 = year.trim().parse().map_err(|_| invalid())?;
                Self::new(year, month)
            }
            (None, None) => Ok(Self::containing(today)),
            _ => Err(invalid()),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day;
        self.first_day.iter_days().take_while(move |d| *d <= last)
    }

    /// Whether a reservation touches any day of this month.
    pub fn touches(&self, start: NaiveDate, end: NaiveDate) -> bool {
        intervals_overlap(self.first_day, self.last_day, start, end)
    }
}

/// Availability of a single day.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay<R> {
    pub date: NaiveDate,
    pub is_available: bool,
    pub reservations: Vec<R>,
}

/// Build one entry per day of `window`, listing the blocking reservations
/// that cover that day.
pub fn build_calendar<R>(window: &MonthWindow, reservations: &[R]) -> Vec<CalendarDay<R>>
where
    R: Reserved + Clone,
{
    let relevant: Vec<&R> = reservations
        .iter()
        .filter(|r| r.status().blocks_availability())
        .filter(|r| window.touches(r.start_date(), r.end_date()))
        .collect();

    window
        .days()
        .map(|date| {
            let covering: Vec<R> = relevant
                .iter()
                .filter(|r| r.start_date() <= date && date <= r.end_date())
                .map(|r| (*r).clone())
                .collect();
            CalendarDay {
                date,
                is_available: covering.is_empty(),
                reservations: covering,
            }
        })
        .collect()
}
