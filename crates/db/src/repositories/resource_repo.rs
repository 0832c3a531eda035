//! Repository for the `resources` and `resource_features` tables.

use rental_core::resource::{ResourceKind, ResourceStatus};
use rental_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::resource::{CreateResource, Resource, ResourceListParams, UpdateResource};

/// Column list for resource queries. Expects `r` for the resource row and
/// `c` for its (left-joined) category.
const COLUMNS: &str = "\
    r.id, r.kind, r.title, r.description, r.category_id, c.title AS category_title, \
    r.price_per_unit, r.deposit, r.status_id, r.attributes, \
    COALESCE( \
        (SELECT array_agg(rf.feature_id ORDER BY rf.feature_id) \
         FROM resource_features rf WHERE rf.resource_id = r.id), \
        ARRAY[]::BIGINT[] \
    ) AS feature_ids, \
    r.created_at, r.updated_at";

const FROM: &str = "resources r LEFT JOIN categories c ON c.id = r.category_id";

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

/// Provides CRUD operations for rentable resources.
pub struct ResourceRepo;

impl ResourceRepo {
    /// Insert a resource of `kind` together with its feature links.
    pub async fn create(
        pool: &PgPool,
        kind: ResourceKind,
        input: &CreateResource,
    ) -> Result<Resource, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO resources \
                (kind, title, description, category_id, price_per_unit, deposit, \
                 status_id, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, '{}'::jsonb)) \
             RETURNING id",
        )
        .bind(kind.as_str())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price_per_unit)
        .bind(input.deposit)
        .bind(input.status.unwrap_or(ResourceStatus::Available).id())
        .bind(&input.attributes)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_features(&mut *tx, id, &input.feature_ids).await?;
        let resource = Self::fetch(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(resource)
    }

    /// Find a resource of `kind` by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE r.id = $1 AND r.kind = $2");
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List resources of `kind` with optional filters.
    pub async fn list(
        pool: &PgPool,
        kind: ResourceKind,
        params: &ResourceListParams,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} \
             WHERE r.kind = $1 \
               AND ($2::BIGINT IS NULL OR r.category_id = $2) \
               AND ($3::SMALLINT IS NULL OR r.status_id = $3) \
               AND ($4::BIGINT IS NULL OR EXISTS ( \
                    SELECT 1 FROM resource_features rf \
                    WHERE rf.resource_id = r.id AND rf.feature_id = $4)) \
               AND ($5::TEXT IS NULL OR r.title ILIKE $5 OR r.description ILIKE $5) \
             ORDER BY {} \
             LIMIT $6 OFFSET $7",
            params.ordering.sql()
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(kind.as_str())
            .bind(params.category_id)
            .bind(params.status.map(ResourceStatus::id))
            .bind(params.feature_id)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every resource of `kind` with status `available`, by ID.
    pub async fn list_available(
        pool: &PgPool,
        kind: ResourceKind,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM} \
             WHERE r.kind = $1 AND r.status_id = $2 \
             ORDER BY r.id"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(kind.as_str())
            .bind(ResourceStatus::Available.id())
            .fetch_all(pool)
            .await
    }

    /// Update a resource. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE resources SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                category_id = COALESCE($5, category_id), \
                price_per_unit = COALESCE($6, price_per_unit), \
                deposit = COALESCE($7, deposit), \
                status_id = COALESCE($8, status_id), \
                attributes = COALESCE($9, attributes) \
             WHERE id = $1 AND kind = $2 \
             RETURNING id",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price_per_unit)
        .bind(input.deposit)
        .bind(input.status.map(ResourceStatus::id))
        .bind(&input.attributes)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(feature_ids) = &input.feature_ids {
            Self::replace_features(&mut *tx, id, feature_ids).await?;
        }
        let resource = Self::fetch(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some(resource))
    }

    /// Delete a resource of `kind`. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while reservations reference it.
    pub async fn delete(pool: &PgPool, kind: ResourceKind, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch(conn: &mut PgConnection, id: DbId) -> Result<Resource, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE r.id = $1");
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Replace the feature links of a resource. Features of another kind
    /// are ignored.
    async fn replace_features(
        conn: &mut PgConnection,
        resource_id: DbId,
        feature_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM resource_features WHERE resource_id = $1")
            .bind(resource_id)
            .execute(&mut *conn)
            .await?;

        if feature_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO resource_features (resource_id, feature_id) \
             SELECT r.id, f.id \
             FROM resources r \
             JOIN features f ON f.kind = r.kind \
             WHERE r.id = $1 AND f.id = ANY($2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(resource_id)
        .bind(feature_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
