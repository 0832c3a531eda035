//! Repository for the per-kind `categories` and `features` tables.

use rental_core::resource::ResourceKind;
use rental_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{Category, CreateCategory, CreateFeature, Feature};

const CATEGORY_COLUMNS: &str = "id, kind, title, icon, created_at, updated_at";

const FEATURE_COLUMNS: &str = "id, kind, title, created_at, updated_at";

/// Provides CRUD operations for categories and features.
pub struct CatalogRepo;

impl CatalogRepo {
    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Insert a category for `kind`. Titles are unique per kind.
    pub async fn create_category(
        pool: &PgPool,
        kind: ResourceKind,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (kind, title, icon) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(kind.as_str())
            .bind(&input.title)
            .bind(&input.icon)
            .fetch_one(pool)
            .await
    }

    /// Find a category of `kind` by ID.
    pub async fn find_category(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND kind = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List categories of `kind` ordered by title.
    pub async fn list_categories(
        pool: &PgPool,
        kind: ResourceKind,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = $1 ORDER BY title, id");
        sqlx::query_as::<_, Category>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Delete a category. Resources in it become uncategorized.
    pub async fn delete_category(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Features
    // -----------------------------------------------------------------------

    pub async fn create_feature(
        pool: &PgPool,
        kind: ResourceKind,
        input: &CreateFeature,
    ) -> Result<Feature, sqlx::Error> {
        let query = format!(
            "INSERT INTO features (kind, title) VALUES ($1, $2) RETURNING {FEATURE_COLUMNS}"
        );
        sqlx::query_as::<_, Feature>(&query)
            .bind(kind.as_str())
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn list_features(
        pool: &PgPool,
        kind: ResourceKind,
    ) -> Result<Vec<Feature>, sqlx::Error> {
        let query =
            format!("SELECT {FEATURE_COLUMNS} FROM features WHERE kind = $1 ORDER BY title, id");
        sqlx::query_as::<_, Feature>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Delete a feature and unlink it from every resource.
    pub async fn delete_feature(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM features WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
