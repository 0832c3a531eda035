use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use rental_core::resource::ResourceKind;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// Liveness payload for load balancers and the bot's watchdog.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub pool: PoolStats,
    /// Resource kinds mounted under `/api`.
    pub kinds: Vec<&'static str>,
}

/// GET /health
///
/// Answers 503 while the database is unreachable so the instance is taken
/// out of rotation.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = match rental_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pool: PoolStats {
            size: state.pool.size(),
            idle: state.pool.num_idle(),
        },
        kinds: ResourceKind::ALL.iter().map(|k| k.plural()).collect(),
    };
    (code, Json(body))
}

/// Health routes sit at the root, outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
