pub mod health;
pub mod kind;

use axum::Router;
use rental_core::resource::ResourceKind;

use crate::state::AppState;

/// Build the `/api` route tree: one identical subtree per resource kind.
///
/// ```text
/// /cars/...                                        see kind::router
/// /motorcycles/...
/// /houses/...
/// /excursions/...
/// ```
pub fn api_routes() -> Router<AppState> {
    ResourceKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.nest(&format!("/{}", kind.plural()), kind::router(kind))
        })
}
