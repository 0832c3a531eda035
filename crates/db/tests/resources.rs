//! Integration tests for resource and catalog repositories.

use rental_core::resource::{ResourceKind, ResourceStatus};
use rental_db::models::catalog::{CreateCategory, CreateFeature};
use rental_db::models::resource::{
    CreateResource, ResourceListParams, ResourceOrdering, UpdateResource,
};
use rental_db::repositories::{CatalogRepo, ResourceRepo};
use sqlx::PgPool;

fn new_resource(title: &str, price: i64) -> CreateResource {
    CreateResource {
        title: title.to_string(),
        description: String::new(),
        category_id: None,
        price_per_unit: price,
        deposit: None,
        status: None,
        attributes: None,
        feature_ids: Vec::new(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_category_and_features(pool: PgPool) {
    let category = CatalogRepo::create_category(
        &pool,
        ResourceKind::Car,
        &CreateCategory {
            title: "Sedan".to_string(),
            icon: None,
        },
    )
    .await
    .unwrap();
    let ac = CatalogRepo::create_feature(
        &pool,
        ResourceKind::Car,
        &CreateFeature {
            title: "Air conditioning".to_string(),
        },
    )
    .await
    .unwrap();
    let pool_feature = CatalogRepo::create_feature(
        &pool,
        ResourceKind::House,
        &CreateFeature {
            title: "Swimming pool".to_string(),
        },
    )
    .await
    .unwrap();

    let mut input = new_resource("Toyota Camry", 50);
    input.category_id = Some(category.id);
    input.feature_ids = vec![ac.id, pool_feature.id];
    input.attributes = Some(serde_json::json!({"year": 2021, "transmission": "automatic"}));

    let car = ResourceRepo::create(&pool, ResourceKind::Car, &input)
        .await
        .unwrap();
    assert_eq!(car.kind, ResourceKind::Car);
    assert_eq!(car.status, ResourceStatus::Available);
    assert_eq!(car.category_title.as_deref(), Some("Sedan"));
    // House features are not linked to cars.
    assert_eq!(car.feature_ids, vec![ac.id]);
    assert_eq!(car.attributes["year"], 2021);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_is_scoped_to_kind(pool: PgPool) {
    let car = ResourceRepo::create(&pool, ResourceKind::Car, &new_resource("Golf", 40))
        .await
        .unwrap();

    assert!(ResourceRepo::find_by_id(&pool, ResourceKind::Car, car.id)
        .await
        .unwrap()
        .is_some());
    assert!(ResourceRepo::find_by_id(&pool, ResourceKind::House, car.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_ordering(pool: PgPool) {
    for (title, price) in [("Cheap", 10), ("Mid", 50), ("Premium", 90)] {
        ResourceRepo::create(&pool, ResourceKind::Car, &new_resource(title, price))
            .await
            .unwrap();
    }
    let mut booked = new_resource("Broken", 5);
    booked.status = Some(ResourceStatus::Booked);
    ResourceRepo::create(&pool, ResourceKind::Car, &booked)
        .await
        .unwrap();

    let params = ResourceListParams {
        status: Some(ResourceStatus::Available),
        ordering: ResourceOrdering::PriceDesc,
        ..Default::default()
    };
    let titles: Vec<String> = ResourceRepo::list(&pool, ResourceKind::Car, &params)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Premium", "Mid", "Cheap"]);

    let params = ResourceListParams {
        search: Some("prem".to_string()),
        ..Default::default()
    };
    let found = ResourceRepo::list(&pool, ResourceKind::Car, &params)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let available = ResourceRepo::list_available(&pool, ResourceKind::Car)
        .await
        .unwrap();
    assert_eq!(available.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_present_fields(pool: PgPool) {
    let house = ResourceRepo::create(&pool, ResourceKind::House, &new_resource("Villa", 200))
        .await
        .unwrap();

    let update = UpdateResource {
        status: Some(ResourceStatus::Booked),
        ..Default::default()
    };
    let updated = ResourceRepo::update(&pool, ResourceKind::House, house.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ResourceStatus::Booked);
    assert_eq!(updated.title, "Villa");
    assert_eq!(updated.price_per_unit, 200);

    let missing = ResourceRepo::update(&pool, ResourceKind::Car, house.id, &update)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_resource_and_category(pool: PgPool) {
    let category = CatalogRepo::create_category(
        &pool,
        ResourceKind::House,
        &CreateCategory {
            title: "Villa".to_string(),
            icon: Some("/static/icons/villa.svg".to_string()),
        },
    )
    .await
    .unwrap();
    let mut input = new_resource("Sea view", 120);
    input.category_id = Some(category.id);
    let house = ResourceRepo::create(&pool, ResourceKind::House, &input)
        .await
        .unwrap();

    assert!(CatalogRepo::delete_category(&pool, ResourceKind::House, category.id)
        .await
        .unwrap());
    let house = ResourceRepo::find_by_id(&pool, ResourceKind::House, house.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(house.category_id, None);

    assert!(ResourceRepo::delete(&pool, ResourceKind::House, house.id)
        .await
        .unwrap());
    assert!(!ResourceRepo::delete(&pool, ResourceKind::House, house.id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_category_title_violates_unique(pool: PgPool) {
    let input = CreateCategory {
        title: "SUV".to_string(),
        icon: None,
    };
    CatalogRepo::create_category(&pool, ResourceKind::Car, &input)
        .await
        .unwrap();
    // Same title under another kind is fine.
    CatalogRepo::create_category(&pool, ResourceKind::Motorcycle, &input)
        .await
        .unwrap();

    let err = CatalogRepo::create_category(&pool, ResourceKind::Car, &input)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_categories_kind_title"));
        }
        other => panic!("expected unique violation, got {other}"),
    }
}
