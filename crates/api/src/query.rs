//! Shared query parameter types for API handlers.
//!
//! Dates, month numbers and the calendar's resource ID are taken as raw
//! strings so that malformed values produce the fixed validation messages.

use rental_core::error::CoreError;
use rental_core::types::DbId;
use serde::Deserialize;

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `?month=&year=&<kind>_id=` for the booking calendar.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub month: Option<String>,
    pub year: Option<String>,
    #[serde(
        alias = "car_id",
        alias = "motorcycle_id",
        alias = "house_id",
        alias = "excursion_id"
    )]
    pub resource_id: Option<String>,
}

impl CalendarParams {
    /// The requested resource, if any. An empty value means none.
    pub fn resource_id(&self) -> Result<Option<DbId>, CoreError> {
        match self.resource_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| CoreError::Validation(format!("Invalid resource id: '{raw}'"))),
        }
    }
}
