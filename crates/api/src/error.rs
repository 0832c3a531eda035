use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rental_core::booking::{BookingError, CONFLICT_MESSAGE};
use rental_core::error::CoreError;
use rental_db::models::reservation::{Reservation, ReservationSummary};
use serde_json::json;

/// SQLSTATE codes surfaced as client errors.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Handler error. Every variant renders as `{"error", "code"}` JSON; booking
/// conflicts add `conflicting_reservations`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rental_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested dates overlap existing blocking reservations.
    #[error("{}", CONFLICT_MESSAGE)]
    ReservationConflict { conflicting: Vec<Reservation> },

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<BookingError<Reservation, sqlx::Error>> for AppError {
    fn from(err: BookingError<Reservation, sqlx::Error>) -> Self {
        match err {
            BookingError::Core(core) => AppError::Core(core),
            BookingError::Conflict { conflicting } => AppError::ReservationConflict { conflicting },
            BookingError::Store(db) => AppError::Database(db),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::from(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::ReservationConflict { conflicting } => {
                let conflicting: Vec<ReservationSummary> =
                    conflicting.iter().map(ReservationSummary::from).collect();
                let body = json!({
                    "error": CONFLICT_MESSAGE,
                    "code": "CONFLICT",
                    "conflicting_reservations": conflicting,
                });
                return (StatusCode::CONFLICT, Json(body)).into_response();
            }
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

type Classified = (StatusCode, &'static str, String);

/// Sanitized 500. Details go to the log, never to the client.
fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: CoreError) -> Classified {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a sqlx error onto the response triple.
///
/// Missing rows are 404. Named unique constraints (`uq_*`), the reservation
/// overlap constraint and foreign keys are 409. Anything else is logged and
/// sanitized.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            );
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        Some(EXCLUSION_VIOLATION) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            CONFLICT_MESSAGE.to_string(),
        ),
        Some(FOREIGN_KEY_VIOLATION) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Operation violates foreign key constraint: {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}
