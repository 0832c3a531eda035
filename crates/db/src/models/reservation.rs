//! Reservation models and DTOs.

use chrono::NaiveDate;
use rental_core::booking::{BookingRequest, ContactInfo, ReservationStatus, Reserved};
use rental_core::dates::parse_date;
use rental_core::error::CoreError;
use rental_core::resource::ResourceKind;
use rental_core::types::{DbId, Price, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `reservations` table, joined with its resource.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub resource_id: DbId,
    #[sqlx(try_from = "String")]
    pub resource_kind: ResourceKind,
    pub resource_title: String,
    pub telegram_id: Option<String>,
    pub client_name: String,
    pub phone_number: String,
    pub comment: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day count, computed in SQL.
    pub total_days: i32,
    pub participants: i32,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: ReservationStatus,
    pub total_price: Price,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reserved for Reservation {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn status(&self) -> ReservationStatus {
        self.status
    }
}

/// Contact-free view of a reservation for calendars and availability
/// answers.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationSummary {
    pub id: DbId,
    pub resource_id: DbId,
    pub resource_title: String,
    pub status: ReservationStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `"YYYY-MM-DD - YYYY-MM-DD"`, as shown by the bot.
    pub period: String,
    pub total_days: i32,
}

impl From<&Reservation> for ReservationSummary {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            resource_id: r.resource_id,
            resource_title: r.resource_title.clone(),
            status: r.status,
            start_date: r.start_date,
            end_date: r.end_date,
            period: format!("{} - {}", r.start_date, r.end_date),
            total_days: r.total_days,
        }
    }
}

impl Reserved for ReservationSummary {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn status(&self) -> ReservationStatus {
        self.status
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Body of `POST /api/{kind}/bookings/`.
///
/// Dates arrive as strings so malformed values get the fixed date-format
/// message instead of a generic JSON rejection. The kind-specific key
/// (`car`, `house`, ...) is accepted for `resource_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservation {
    #[serde(
        alias = "car",
        alias = "motorcycle",
        alias = "house",
        alias = "excursion"
    )]
    pub resource_id: DbId,
    pub start_date: String,
    pub end_date: String,
    pub client_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub telegram_id: Option<String>,
    pub participants: Option<i32>,
}

impl CreateReservation {
    /// Parse dates and resolve the unit count for `kind`.
    pub fn into_request(self, kind: ResourceKind) -> Result<BookingRequest, CoreError> {
        let start_date = parse_date(&self.start_date)?;
        let end_date = parse_date(&self.end_date)?;
        let unit_count = kind.unit_count(self.participants)?;

        Ok(BookingRequest {
            resource_id: self.resource_id,
            start_date,
            end_date,
            contact: ContactInfo {
                client_name: self.client_name.trim().to_string(),
                phone_number: self.phone_number.trim().to_string(),
                comment: self.comment,
                telegram_id: self.telegram_id,
            },
            unit_count,
        })
    }
}

/// Body of `PATCH /api/{kind}/bookings/{id}/status/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReservationStatus {
    pub status: ReservationStatus,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/{kind}/bookings/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationListParams {
    pub status: Option<ReservationStatus>,
    pub telegram_id: Option<String>,
    pub resource_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Telegram clients send chat IDs as either JSON numbers or strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
