//! Rentable resource models and DTOs.
//!
//! One table holds every kind. Kind-specific specs (year, engine volume,
//! floors, area, excursion length, ...) live in the `attributes` JSON
//! object.

use rental_core::resource::{ResourceKind, ResourceStatus};
use rental_core::types::{DbId, Price, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `resources` table, joined with its category title and
/// feature IDs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resource {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: ResourceKind,
    pub title: String,
    pub description: String,
    pub category_id: Option<DbId>,
    pub category_title: Option<String>,
    /// Price per day (per person per day for excursions).
    pub price_per_unit: Price,
    pub deposit: Option<Price>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: ResourceStatus,
    pub attributes: serde_json::Value,
    pub feature_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a resource.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResource {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<DbId>,
    #[validate(range(min = 0, message = "price_per_unit must not be negative"))]
    pub price_per_unit: Price,
    #[validate(range(min = 0, message = "deposit must not be negative"))]
    pub deposit: Option<Price>,
    pub status: Option<ResourceStatus>,
    pub attributes: Option<serde_json::Value>,
    #[serde(default)]
    pub feature_ids: Vec<DbId>,
}

/// DTO for updating a resource. Only non-`None` fields are applied;
/// `feature_ids`, when present, replaces the whole feature set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResource {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(range(min = 0, message = "price_per_unit must not be negative"))]
    pub price_per_unit: Option<Price>,
    #[validate(range(min = 0, message = "deposit must not be negative"))]
    pub deposit: Option<Price>,
    pub status: Option<ResourceStatus>,
    pub attributes: Option<serde_json::Value>,
    pub feature_ids: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Sort order for resource listings (`?ordering=`), Django-style with a
/// leading `-` for descending.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub enum ResourceOrdering {
    #[serde(rename = "price_per_unit")]
    PriceAsc,
    #[serde(rename = "-price_per_unit")]
    PriceDesc,
    #[serde(rename = "created_at")]
    CreatedAsc,
    #[default]
    #[serde(rename = "-created_at")]
    CreatedDesc,
    #[serde(rename = "title")]
    Title,
}

impl ResourceOrdering {
    /// `ORDER BY` clause body. Always ends with the primary key so paging is
    /// stable.
    pub fn sql(self) -> &'static str {
        match self {
            Self::PriceAsc => "r.price_per_unit ASC, r.id ASC",
            Self::PriceDesc => "r.price_per_unit DESC, r.id ASC",
            Self::CreatedAsc => "r.created_at ASC, r.id ASC",
            Self::CreatedDesc => "r.created_at DESC, r.id DESC",
            Self::Title => "r.title ASC, r.id ASC",
        }
    }
}

/// Query parameters for `GET /api/{kind}/{kind}/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceListParams {
    pub category_id: Option<DbId>,
    pub status: Option<ResourceStatus>,
    pub feature_id: Option<DbId>,
    /// Case-insensitive substring match on title and description.
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: ResourceOrdering,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
