//! Booking interval conflict detection and pricing.
//!
//! A reservation holds a resource for the closed date interval
//! `[start_date, end_date]`. Two intervals overlap when each starts no later
//! than the other ends, so a reservation ending on day D conflicts with one
//! starting on day D. Prices are billed per inclusive day, which is why the
//! boundary day counts on both sides.
//!
//! The engine is written once for every resource kind. Storage is reached
//! through [`ReservationLedger`]; implementations must make
//! [`create_reservation`] atomic per resource (row lock, serializable
//! transaction, or an exclusion constraint surfaced as a conflict).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Price, Timestamp};

/// Validation message for a range whose end is not after its start.
pub const END_BEFORE_START_MESSAGE: &str = "end date must be after start date";

/// Message attached to every booking conflict.
pub const CONFLICT_MESSAGE: &str = "The selected dates are already booked";

// ---------------------------------------------------------------------------
// Reservation status
// ---------------------------------------------------------------------------

/// Reservation lifecycle status.
///
/// Discriminants match the `reservation_statuses` seed rows (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending = 1,
    Confirmed = 2,
    Active = 3,
    Completed = 4,
    Cancelled = 5,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Active,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    /// Statuses that hold the resource and take part in conflict checks.
    pub const BLOCKING: [ReservationStatus; 3] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Active,
    ];

    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a reservation in this status holds its dates.
    pub fn blocks_availability(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Active)
    }

    /// Whether moving from `self` to `to` starts holding dates again, which
    /// requires the same conflict check as a new booking.
    pub fn requires_conflict_check(self, to: ReservationStatus) -> bool {
        !self.blocks_availability() && to.blocks_availability()
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown reservation status: '{s}'")))
    }
}

impl TryFrom<i16> for ReservationStatus {
    type Error = CoreError;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.id() == id)
            .ok_or_else(|| CoreError::Internal(format!("Unknown reservation status id: {id}")))
    }
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// Closed-interval overlap test on calendar days.
pub fn intervals_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 <= e2 && s2 <= e1
}

/// Inclusive day count: both boundary days are billed.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// A validated booking period. `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end <= start {
            return Err(CoreError::Validation(END_BEFORE_START_MESSAGE.to_string()));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `[start, end]` shares at least one day with this range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }

    pub fn total_days(&self) -> i64 {
        inclusive_days(self.start, self.end)
    }

    /// Price this range at `unit_price` per day for `unit_count` units.
    pub fn quote(&self, unit_price: Price, unit_count: i32) -> Result<PriceQuote, CoreError> {
        if unit_price < 0 {
            return Err(CoreError::Validation(
                "unit price must not be negative".to_string(),
            ));
        }
        if unit_count < 1 {
            return Err(CoreError::Validation(
                "unit count must be at least 1".to_string(),
            ));
        }

        let total_days = self.total_days();
        let total_price = total_days
            .checked_mul(unit_price)
            .and_then(|p| p.checked_mul(i64::from(unit_count)))
            .ok_or_else(|| CoreError::Validation("total price is out of range".to_string()))?;

        Ok(PriceQuote {
            total_days,
            total_price,
        })
    }
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Duration and price computed for a booking period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub total_days: i64,
    pub total_price: Price,
}

/// `total_days = (end - start).days + 1`, `total_price = total_days * unit_price * unit_count`.
///
/// Rejects `end <= start`.
pub fn compute_price(
    start: NaiveDate,
    end: NaiveDate,
    unit_price: Price,
    unit_count: i32,
) -> Result<PriceQuote, CoreError> {
    DateRange::new(start, end)?.quote(unit_price, unit_count)
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Anything that occupies a resource for a date interval.
pub trait Reserved {
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;
    fn status(&self) -> ReservationStatus;
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability<R> {
    pub is_available: bool,
    pub conflicting: Vec<R>,
}

/// Test `requested` against existing reservations of one resource.
///
/// Non-blocking reservations (completed, cancelled) are skipped even if the
/// caller passes them in. Pure: identical inputs give identical results.
pub fn check_availability<R, I>(requested: &DateRange, existing: I) -> Availability<R>
where
    R: Reserved,
    I: IntoIterator<Item = R>,
{
    let conflicting: Vec<R> = existing
        .into_iter()
        .filter(|r| r.status().blocks_availability())
        .filter(|r| requested.overlaps(r.start_date(), r.end_date()))
        .collect();

    Availability {
        is_available: conflicting.is_empty(),
        conflicting,
    }
}

// ---------------------------------------------------------------------------
// Reservation creation
// ---------------------------------------------------------------------------

/// Who the reservation is for. Collected by the Telegram bot.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactInfo {
    #[validate(length(min = 1, max = 200, message = "client_name must be 1-200 characters"))]
    pub client_name: String,
    #[validate(length(min = 1, max = 20, message = "phone_number must be 1-20 characters"))]
    pub phone_number: String,
    #[serde(default)]
    pub comment: String,
    #[validate(length(max = 100, message = "telegram_id must be at most 100 characters"))]
    pub telegram_id: Option<String>,
}

/// A request to hold `resource_id` from `start_date` to `end_date`.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub resource_id: DbId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contact: ContactInfo,
    pub unit_count: i32,
}

/// A reservation that passed every check and is ready to be persisted.
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub resource_id: DbId,
    pub period: DateRange,
    pub contact: ContactInfo,
    pub unit_count: i32,
    pub quote: PriceQuote,
    pub status: ReservationStatus,
    pub created_at: Timestamp,
}

/// Storage capabilities the engine needs for one resource kind.
#[async_trait]
pub trait ReservationLedger: Send {
    type Record: Reserved + Send;
    type Error: Send;

    /// Entity label for not-found errors.
    fn entity_name(&self) -> &'static str {
        "Resource"
    }

    /// Unit price of the resource, or `None` if it does not exist.
    async fn unit_price(&mut self, resource_id: DbId) -> Result<Option<Price>, Self::Error>;

    /// Blocking reservations of the resource that may overlap `period`.
    async fn blocking_reservations(
        &mut self,
        resource_id: DbId,
        period: &DateRange,
    ) -> Result<Vec<Self::Record>, Self::Error>;

    /// Persist a validated draft.
    async fn insert(&mut self, draft: &ReservationDraft) -> Result<Self::Record, Self::Error>;
}

/// Why a reservation could not be created.
#[derive(Debug, thiserror::Error)]
pub enum BookingError<R, E> {
    /// Validation or not-found failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The requested dates overlap these blocking reservations.
    #[error("{}", CONFLICT_MESSAGE)]
    Conflict { conflicting: Vec<R> },

    /// The ledger failed.
    #[error("Reservation store error: {0}")]
    Store(E),
}

/// Validate, check for conflicts, price, and persist a new pending
/// reservation.
pub async fn create_reservation<L: ReservationLedger>(
    ledger: &mut L,
    request: &BookingRequest,
    now: Timestamp,
) -> Result<L::Record, BookingError<L::Record, L::Error>> {
    let period = DateRange::new(request.start_date, request.end_date)?;
    request.contact.validate().map_err(CoreError::from)?;
    if request.unit_count < 1 {
        let msg = "unit count must be at least 1".to_string();
        return Err(CoreError::Validation(msg).into());
    }

    let unit_price = ledger
        .unit_price(request.resource_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| CoreError::NotFound {
            entity: ledger.entity_name(),
            id: request.resource_id,
        })?;

    let existing = ledger
        .blocking_reservations(request.resource_id, &period)
        .await
        .map_err(BookingError::Store)?;

    let availability = check_availability(&period, existing);
    if !availability.is_available {
        return Err(BookingError::Conflict {
            conflicting: availability.conflicting,
        });
    }

    let quote = period.quote(unit_price, request.unit_count)?;

    let draft = ReservationDraft {
        resource_id: request.resource_id,
        period,
        contact: request.contact.clone(),
        unit_count: request.unit_count,
        quote,
        status: ReservationStatus::Pending,
        created_at: now,
    };

    ledger.insert(&draft).await.map_err(BookingError::Store)
}
