//! Handlers for per-kind categories and features.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use rental_core::error::CoreError;
use rental_core::resource::ResourceKind;
use rental_core::types::DbId;
use rental_db::models::catalog::{Category, CreateCategory, CreateFeature, Feature};
use rental_db::repositories::CatalogRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::state::AppState;

/// GET /api/{kinds}/categories/
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CatalogRepo::list_categories(&state.pool, kind).await?;
    Ok(Json(categories))
}

/// POST /api/{kinds}/categories/
pub async fn create_category(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    input.validate()?;
    let category = CatalogRepo::create_category(&state.pool, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/{kinds}/categories/{id}/
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CatalogRepo::delete_category(&state.pool, kind, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
    }
}

/// GET /api/{kinds}/features/
pub async fn list_features(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
) -> AppResult<Json<Vec<Feature>>> {
    let features = CatalogRepo::list_features(&state.pool, kind).await?;
    Ok(Json(features))
}

/// POST /api/{kinds}/features/
pub async fn create_feature(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Json(input): Json<CreateFeature>,
) -> AppResult<(StatusCode, Json<Feature>)> {
    input.validate()?;
    let feature = CatalogRepo::create_feature(&state.pool, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(feature)))
}

/// DELETE /api/{kinds}/features/{id}/
pub async fn delete_feature(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CatalogRepo::delete_feature(&state.pool, kind, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Feature",
            id,
        }))
    }
}
