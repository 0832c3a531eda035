//! Calendar date parsing for query strings and request bodies.
//!
//! Every externally supplied date is `YYYY-MM-DD`. Parsing failures always
//! produce the same fixed message so clients can match on it.

use chrono::NaiveDate;

use crate::booking::DateRange;
use crate::error::CoreError;

/// Wire format for all dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error message returned for any malformed date.
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Use YYYY-MM-DD";

/// Error message returned when only one side of a date range is supplied,
/// or neither side where a range is mandatory.
pub const MISSING_DATES_MESSAGE: &str = "start_date and end_date are required";

/// Parse a single `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::Validation(INVALID_DATE_MESSAGE.to_string()))
}

/// Parse an optional `start_date`/`end_date` pair.
///
/// Returns `Ok(None)` when both are absent (or empty). A half-specified
/// pair is a validation error, as is a range whose end is not after its
/// start.
pub fn parse_optional_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, CoreError> {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = end.filter(|s| !s.trim().is_empty());

    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let range = DateRange::new(parse_date(start)?, parse_date(end)?)?;
            Ok(Some(range))
        }
        _ => Err(CoreError::Validation(MISSING_DATES_MESSAGE.to_string())),
    }
}

/// Parse a mandatory `start_date`/`end_date` pair.
pub fn parse_required_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, CoreError> {
    parse_optional_range(start, end)?
        .ok_or_else(|| CoreError::Validation(MISSING_DATES_MESSAGE.to_string()))
}
