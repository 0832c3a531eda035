//! Availability answers for the booking bot.
//!
//! All reads here are non-transactional; a resource reported free may be
//! taken by the time a booking is attempted, which then answers 409.

use std::collections::HashMap;

use axum::extract::State;
use axum::Extension;
use chrono::{NaiveDate, Utc};
use rental_core::booking::check_availability;
use rental_core::calendar::{build_calendar, CalendarDay, MonthWindow};
use rental_core::dates::{parse_optional_range, parse_required_range};
use rental_core::error::CoreError;
use rental_core::resource::{ResourceKind, ResourceStatus};
use rental_core::types::DbId;
use rental_db::models::reservation::{Reservation, ReservationSummary};
use rental_db::models::resource::Resource;
use rental_db::repositories::{ReservationRepo, ResourceRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{Json, Path, Query};
use crate::query::{CalendarParams, DateRangeParams};
use crate::state::AppState;

pub const AVAILABLE_MESSAGE: &str = "Available";
pub const UNAVAILABLE_MESSAGE: &str = "Not available for the selected dates";

/// Response for a single-resource availability check.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub resource_id: DbId,
    pub resource_title: String,
    pub resource_status: ResourceStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub conflicting_reservations: Vec<ReservationSummary>,
    pub message: &'static str,
}

/// The month a calendar covers.
#[derive(Debug, Serialize)]
pub struct CalendarPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub period: CalendarPeriod,
    pub calendar: Vec<CalendarDay<ReservationSummary>>,
    pub booked_periods: Vec<ReservationSummary>,
    pub resource_id: Option<DbId>,
}

async fn find_resource(state: &AppState, kind: ResourceKind, id: DbId) -> AppResult<Resource> {
    let resource = ResourceRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity_name(),
            id,
        })?;
    Ok(resource)
}

/// GET /api/{kinds}/available-{kinds}/
///
/// Resources with status `available`. With a date range, those holding a
/// blocking reservation that overlaps it are left out.
pub async fn available_resources(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<Vec<Resource>>> {
    let range = parse_optional_range(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )?;
    let resources = ResourceRepo::list_available(&state.pool, kind).await?;

    let Some(range) = range else {
        return Ok(Json(resources));
    };

    let reservations = ReservationRepo::list_blocking_in_window(
        &state.pool,
        kind,
        None,
        range.start(),
        range.end(),
    )
    .await?;

    let mut by_resource: HashMap<DbId, Vec<Reservation>> = HashMap::new();
    for reservation in reservations {
        by_resource
            .entry(reservation.resource_id)
            .or_default()
            .push(reservation);
    }

    let free: Vec<Resource> = resources
        .into_iter()
        .filter(|resource| {
            let existing = by_resource.remove(&resource.id).unwrap_or_default();
            check_availability(&range, existing).is_available
        })
        .collect();

    tracing::debug!(
        kind = %kind,
        start_date = %range.start(),
        end_date = %range.end(),
        available = free.len(),
        "Listed available resources"
    );
    Ok(Json(free))
}

/// GET /api/{kinds}/{kind}-availability/{id}/
pub async fn resource_availability(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<AvailabilityResponse>> {
    let resource = find_resource(&state, kind, id).await?;
    let range = parse_required_range(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )?;

    let existing =
        ReservationRepo::blocking_overlapping(&state.pool, resource.id, &range, None).await?;
    let availability = check_availability(&range, existing);

    let is_available =
        availability.is_available && resource.status == ResourceStatus::Available;

    Ok(Json(AvailabilityResponse {
        resource_id: resource.id,
        resource_title: resource.title,
        resource_status: resource.status,
        start_date: range.start(),
        end_date: range.end(),
        is_available,
        conflicting_reservations: availability
            .conflicting
            .iter()
            .map(ReservationSummary::from)
            .collect(),
        message: if is_available {
            AVAILABLE_MESSAGE
        } else {
            UNAVAILABLE_MESSAGE
        },
    }))
}

/// GET /api/{kinds}/booking-calendar/
///
/// Per-day availability for one month (the current one when `month` and
/// `year` are omitted), optionally for a single resource.
pub async fn booking_calendar(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(params): Query<CalendarParams>,
) -> AppResult<Json<CalendarResponse>> {
    let today = Utc::now().date_naive();
    let window = MonthWindow::from_query(params.month.as_deref(), params.year.as_deref(), today)?;
    let resource_id = params.resource_id()?;

    if let Some(resource_id) = resource_id {
        find_resource(&state, kind, resource_id).await?;
    }

    let reservations = ReservationRepo::list_blocking_in_window(
        &state.pool,
        kind,
        resource_id,
        window.first_day,
        window.last_day,
    )
    .await?;
    let booked_periods: Vec<ReservationSummary> =
        reservations.iter().map(ReservationSummary::from).collect();

    Ok(Json(CalendarResponse {
        period: CalendarPeriod {
            start_date: window.first_day,
            end_date: window.last_day,
            month: window.month,
            year: window.year,
        },
        calendar: build_calendar(&window, &booked_periods),
        booked_periods,
        resource_id,
    }))
}
