//! Handlers for `/api/{kinds}/{kinds}` (resource CRUD).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use rental_core::error::CoreError;
use rental_core::resource::ResourceKind;
use rental_core::types::DbId;
use rental_db::models::resource::{CreateResource, Resource, ResourceListParams, UpdateResource};
use rental_db::repositories::{CatalogRepo, ResourceRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::state::AppState;

fn not_found(kind: ResourceKind, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: kind.entity_name(),
        id,
    })
}

/// Reject a category that does not exist for this kind.
async fn ensure_category(
    state: &AppState,
    kind: ResourceKind,
    category_id: Option<DbId>,
) -> AppResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    if CatalogRepo::find_category(&state.pool, kind, category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Category {category_id} does not exist for {}",
            kind.plural()
        ))));
    }
    Ok(())
}

/// POST /api/{kinds}/{kinds}/
pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Json(input): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    input.validate()?;
    ensure_category(&state, kind, input.category_id).await?;

    let resource = ResourceRepo::create(&state.pool, kind, &input).await?;
    tracing::info!(resource_id = resource.id, kind = %kind, "Resource created");
    Ok((StatusCode::CREATED, Json(resource)))
}

/// GET /api/{kinds}/{kinds}/
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(params): Query<ResourceListParams>,
) -> AppResult<Json<Vec<Resource>>> {
    let resources = ResourceRepo::list(&state.pool, kind, &params).await?;
    Ok(Json(resources))
}

/// GET /api/{kinds}/{kinds}/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Resource>> {
    let resource = ResourceRepo::find_by_id(&state.pool, kind, id)
        .await?
        .ok_or_else(|| not_found(kind, id))?;
    Ok(Json(resource))
}

/// PUT /api/{kinds}/{kinds}/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    input.validate()?;
    ensure_category(&state, kind, input.category_id).await?;

    let resource = ResourceRepo::update(&state.pool, kind, id, &input)
        .await?
        .ok_or_else(|| not_found(kind, id))?;
    Ok(Json(resource))
}

/// DELETE /api/{kinds}/{kinds}/{id}/
///
/// Resources with reservations cannot be deleted (409).
pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ResourceRepo::delete(&state.pool, kind, id).await? {
        tracing::info!(resource_id = id, kind = %kind, "Resource deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(kind, id))
    }
}
