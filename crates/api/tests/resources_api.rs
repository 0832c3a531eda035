//! HTTP-level tests for resource, category, and feature endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, booking, create_resource, delete, get, post_json, put_json};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resource_crud(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/houses/houses/",
        serde_json::json!({
            "title": "Villa Aurora",
            "price_per_unit": 250,
            "deposit": 500,
            "attributes": {"floors": 2, "area": 180.5},
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["kind"], "house");
    assert_eq!(created["status"], "available");
    assert_eq!(created["attributes"]["floors"], 2);

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/houses/houses/{id}/"),
        serde_json::json!({"title": "Villa Borealis"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Villa Borealis");
    assert_eq!(updated["price_per_unit"], 250);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/houses/houses/{id}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/houses/houses/{id}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_resource_validates_input(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/cars/",
        serde_json::json!({"title": "", "price_per_unit": 10}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        "/api/cars/cars/",
        serde_json::json!({"title": "Golf", "price_per_unit": -1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_must_match_kind(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/houses/categories/",
        serde_json::json!({"title": "Villa"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = body_json(response).await["id"].as_i64().unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/cars/",
        serde_json::json!({"title": "Golf", "price_per_unit": 40, "category_id": category}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/houses/houses/",
        serde_json::json!({"title": "Cabin", "price_per_unit": 70, "category_id": category}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["category_title"], "Villa");

    let response = post_json(
        common::build_test_app(pool),
        "/api/houses/categories/",
        serde_json::json!({"title": "Villa"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_features_and_filtering(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/features/",
        serde_json::json!({"title": "Child seat"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let feature = body_json(response).await["id"].as_i64().unwrap();

    post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/cars/",
        serde_json::json!({"title": "Family van", "price_per_unit": 60, "feature_ids": [feature]}),
    )
    .await;
    create_resource(&pool, "cars", "Roadster", 90).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/cars/cars/?feature_id={feature}"),
    )
    .await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Family van");

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/cars/cars/?ordering=-price_per_unit",
    )
    .await;
    let list = body_json(response).await;
    assert_eq!(list[0]["title"], "Roadster");

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/cars/features/{feature}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booked_resource_cannot_be_deleted(pool: PgPool) {
    let car = create_resource(&pool, "cars", "Golf", 40).await;
    post_json(
        common::build_test_app(pool.clone()),
        "/api/cars/bookings/",
        booking(car, "2024-06-10", "2024-06-12"),
    )
    .await;

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/cars/cars/{car}/"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
