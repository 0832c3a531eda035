//! Handlers for `/api/{kinds}/bookings`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use rental_core::error::CoreError;
use rental_core::resource::ResourceKind;
use rental_core::types::DbId;
use rental_db::models::reservation::{
    CreateReservation, Reservation, ReservationListParams, UpdateReservationStatus,
};
use rental_db::repositories::ReservationRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Reservation",
        id,
    })
}

/// POST /api/{kinds}/bookings/
///
/// Creates a pending reservation. Answers 409 with the colliding
/// reservations when the dates are taken.
pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Json(input): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let request = input.into_request(kind)?;

    let reservation = ReservationRepo::create(&state.pool, kind, &request).await?;

    tracing::info!(
        reservation_id = reservation.id,
        resource_id = reservation.resource_id,
        kind = %kind,
        total_days = reservation.total_days,
        total_price = reservation.total_price,
        "Reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/{kinds}/bookings/
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(params): Query<ReservationListParams>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = ReservationRepo::list(&state.pool, kind, &params).await?;
    Ok(Json(reservations))
}

/// GET /api/{kinds}/bookings/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(reservation))
}

/// PATCH /api/{kinds}/bookings/{id}/status/
///
/// Any status may follow any other. Moving back into pending, confirmed
/// or active re-checks the dates and may answer 409.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReservationStatus>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationRepo::update_status(&state.pool, kind, id, input.status)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(reservation_id = id, status = %input.status, "Reservation status changed");
    Ok(Json(reservation))
}

/// POST /api/{kinds}/bookings/{id}/recalculate/
pub async fn recalculate(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Reservation>> {
    let reservation = ReservationRepo::recalculate_price(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(reservation))
}
