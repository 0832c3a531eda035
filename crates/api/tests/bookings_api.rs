//! HTTP-level tests for `/api/{kinds}/bookings`.

mod common;

use axum::http::StatusCode;
use common::{body_json, booking, create_resource, get, patch_json, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_booking_returns_201_with_price(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Toyota Camry", 50).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-15"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "pending");
    assert_eq!(json["total_days"], 6);
    assert_eq!(json["total_price"], 300);
    assert_eq!(json["resource_title"], "Toyota Camry");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_accepts_kind_specific_key(pool: PgPool) {
    let house = create_resource(&pool, "houses", "Sea view", 100).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/houses/bookings/",
        serde_json::json!({
            "house": house,
            "start_date": "2024-07-01",
            "end_date": "2024-07-03",
            "client_name": "Boris",
            "phone_number": "+20000000",
            "telegram_id": 123456,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["resource_id"], house);
    assert_eq!(json["telegram_id"], "123456");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_excursion_participants_multiply_price(pool: PgPool) {
    let tour = create_resource(&pool, "excursions", "Waterfalls", 25).await;
    let mut body = booking(tour, "2024-07-01", "2024-07-02");
    body["participants"] = serde_json::json!(3);

    let response = post_json(
        common::build_test_app(pool),
        "/api/excursions/bookings/",
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["participants"], 3);
    assert_eq!(json["total_price"], 2 * 25 * 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_booking_returns_409(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    let first = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-15"),
    )
    .await;
    let first_id = body_json(first).await["id"].as_i64().unwrap();

    // Shares the boundary day 2024-06-15.
    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/bookings/",
        booking(car, "2024-06-15", "2024-06-20"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["conflicting_reservations"][0]["id"], first_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjacent_booking_is_accepted(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-15"),
    )
    .await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/bookings/",
        booking(car, "2024-06-16", "2024-06-20"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_dates_return_400(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "15.06.2024", "2024-06-20"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid date format. Use YYYY-MM-DD"
    );

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-20", "2024-06-20"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/bookings/",
        serde_json::json!({"resource_id": car, "start_date": "2024-06-10"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_resource_returns_404(pool: PgPool) {
    let house = create_resource(&pool, "houses", "Cabin", 70).await;

    // A house ID is not a car.
    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/bookings/",
        booking(house, "2024-06-10", "2024-06-12"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        format!("Car with id {house} not found")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_participants_rejected_for_cars(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    let mut body = booking(car, "2024-06-10", "2024-06-12");
    body["participants"] = serde_json::json!(2);

    let response = post_json(common::build_test_app(pool), "/api/cars/bookings/", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Read, status, recalculate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_get_bookings(pool: PgPool) {
    let bike = create_resource(&pool, "motorcycles", "Honda", 30).await;
    let created = post_json(
        common::build_test_app(pool.clone()),
        "/api/motorcycles/bookings/",
        booking(bike, "2024-06-10", "2024-06-12"),
    )
    .await;
    let id = body_json(created).await["id"].as_i64().unwrap();

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/motorcycles/bookings/?telegram_id=42",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/motorcycles/bookings/{id}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["client_name"], "Anna");

    // Not visible under another kind.
    let response = get(
        common::build_test_app(pool),
        &format!("/api/cars/bookings/{id}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_then_reactivate_conflict(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    let first = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-15"),
    )
    .await;
    let first_id = body_json(first).await["id"].as_i64().unwrap();

    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/cars/bookings/{first_id}/status/"),
        serde_json::json!({"status": "cancelled"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "cancelled");

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-12", "2024-06-18"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = patch_json(
        common::build_test_app(pool),
        &format!("/api/cars/bookings/{first_id}/status/"),
        serde_json::json!({"status": "confirmed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recalculate_after_price_change(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    let created = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-11"),
    )
    .await;
    let id = body_json(created).await["id"].as_i64().unwrap();

    common::put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/cars/cars/{car}/"),
        serde_json::json!({"price_per_unit": 45}),
    )
    .await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/cars/bookings/{id}/recalculate/"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_price"], 90);
}

// ---------------------------------------------------------------------------
// Malformed requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_status_filter_answers_json_400(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/cars/bookings/?status=bogus",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bad_status_body_answers_json_400(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-12"),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = patch_json(
        common::build_test_app(pool),
        &format!("/api/cars/bookings/{id}/status/"),
        serde_json::json!({"status": "archived"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_id_answers_json_400(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/cars/bookings/abc/").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
