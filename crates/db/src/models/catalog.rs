//! Per-kind categories and features.

use rental_core::resource::ResourceKind;
use rental_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: ResourceKind,
    pub title: String,
    pub icon: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `features` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feature {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: ResourceKind,
    pub title: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category. `icon` is a URL or static path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(max = 500, message = "icon must be at most 500 characters"))]
    pub icon: Option<String>,
}

/// DTO for creating a feature.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeature {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
}
