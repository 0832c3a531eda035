//! Routes mounted once per resource kind under `/api/{kinds}`.

use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use rental_core::resource::ResourceKind;

use crate::handlers::{availability, bookings, catalog, resources};
use crate::state::AppState;

/// Subtree for one kind. Shown for cars; other kinds substitute their
/// singular and plural names.
///
/// ```text
/// GET          /available-cars/                 available_resources
/// GET          /car-availability/{id}/          resource_availability
/// GET          /booking-calendar/               booking_calendar
///
/// GET, POST    /bookings/                       list, create
/// GET          /bookings/{id}/                  get_by_id
/// PATCH        /bookings/{id}/status/           update_status
/// POST         /bookings/{id}/recalculate/      recalculate
///
/// GET, POST    /cars/                           list, create
/// GET, PUT,    /cars/{id}/                      get_by_id, update, delete
///   DELETE
///
/// GET, POST    /categories/                     list, create
/// DELETE       /categories/{id}/                delete
/// GET, POST    /features/                       list, create
/// DELETE       /features/{id}/                  delete
/// ```
pub fn router(kind: ResourceKind) -> Router<AppState> {
    let singular = kind.as_str();
    let plural = kind.plural();

    Router::new()
        // Availability
        .route(
            &format!("/available-{plural}/"),
            get(availability::available_resources),
        )
        .route(
            &format!("/{singular}-availability/{{id}}/"),
            get(availability::resource_availability),
        )
        .route("/booking-calendar/", get(availability::booking_calendar))
        // Bookings
        .route("/bookings/", get(bookings::list).post(bookings::create))
        .route("/bookings/{id}/", get(bookings::get_by_id))
        .route("/bookings/{id}/status/", patch(bookings::update_status))
        .route("/bookings/{id}/recalculate/", post(bookings::recalculate))
        // Resources
        .route(
            &format!("/{plural}/"),
            get(resources::list).post(resources::create),
        )
        .route(
            &format!("/{plural}/{{id}}/"),
            get(resources::get_by_id)
                .put(resources::update)
                .delete(resources::delete),
        )
        // Catalog
        .route(
            "/categories/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/categories/{id}/", delete(catalog::delete_category))
        .route(
            "/features/",
            get(catalog::list_features).post(catalog::create_feature),
        )
        .route("/features/{id}/", delete(catalog::delete_feature))
        .layer(Extension(kind))
}
