//! Repository for the `reservations` table.
//!
//! Creation goes through the booking engine in `rental-core` with a
//! [`PgLedger`] over an open transaction. Every read joins `resources` so
//! queries are always scoped to one resource kind.

use chrono::{NaiveDate, Utc};
use rental_core::booking::{
    check_availability, create_reservation, BookingError, BookingRequest, DateRange,
    ReservationDraft, ReservationStatus,
};
use rental_core::resource::ResourceKind;
use rental_core::types::{DbId, Price};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::is_exclusion_violation;
use crate::ledger::PgLedger;
use crate::models::reservation::{Reservation, ReservationListParams};

/// Outcome of a booking write.
pub type BookingResult<T> = Result<T, BookingError<Reservation, sqlx::Error>>;

/// Column list for reservation queries. Expects `rv` for the reservation
/// row and `r` for its resource.
const COLUMNS: &str = "\
    rv.id, rv.resource_id, r.kind AS resource_kind, r.title AS resource_title, \
    rv.telegram_id, rv.client_name, rv.phone_number, rv.comment, \
    rv.start_date, rv.end_date, (rv.end_date - rv.start_date + 1) AS total_days, \
    rv.participants, rv.status_id, rv.total_price, rv.created_at, rv.updated_at";

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

fn blocking_status_ids() -> Vec<i16> {
    ReservationStatus::BLOCKING.iter().map(|s| s.id()).collect()
}

/// Provides booking and lookup operations for reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    // -----------------------------------------------------------------------
    // Engine helpers
    // -----------------------------------------------------------------------

    /// Blocking reservations of `resource_id` that share at least one day
    /// with `period`, optionally ignoring one reservation.
    pub async fn blocking_overlapping<'e, E>(
        executor: E,
        resource_id: DbId,
        period: &DateRange,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<Reservation>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} \
             FROM reservations rv \
             JOIN resources r ON r.id = rv.resource_id \
             WHERE rv.resource_id = $1 \
               AND rv.status_id = ANY($2) \
               AND rv.start_date <= $4 \
               AND rv.end_date >= $3 \
               AND ($5::BIGINT IS NULL OR rv.id <> $5) \
             ORDER BY rv.start_date, rv.id"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(resource_id)
            .bind(blocking_status_ids())
            .bind(period.start())
            .bind(period.end())
            .bind(exclude_id)
            .fetch_all(executor)
            .await
    }

    /// Insert a validated draft and return the joined row.
    pub async fn insert_draft(
        conn: &mut PgConnection,
        draft: &ReservationDraft,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "WITH rv AS ( \
                INSERT INTO reservations \
                    (resource_id, telegram_id, client_name, phone_number, comment, \
                     start_date, end_date, participants, status_id, total_price, created_at) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM rv JOIN resources r ON r.id = rv.resource_id"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(draft.resource_id)
            .bind(&draft.contact.telegram_id)
            .bind(&draft.contact.client_name)
            .bind(&draft.contact.phone_number)
            .bind(&draft.contact.comment)
            .bind(draft.period.start())
            .bind(draft.period.end())
            .bind(draft.unit_count)
            .bind(draft.status.id())
            .bind(draft.quote.total_price)
            .bind(draft.created_at)
            .fetch_one(conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Booking writes
    // -----------------------------------------------------------------------

    /// Create a pending reservation for a resource of `kind`.
    ///
    /// Runs the booking engine inside one transaction. If the exclusion
    /// constraint still rejects the insert, the overlapping rows are
    /// reloaded and reported as a conflict.
    pub async fn create(
        pool: &PgPool,
        kind: ResourceKind,
        request: &BookingRequest,
    ) -> BookingResult<Reservation> {
        let mut tx = pool.begin().await.map_err(BookingError::Store)?;

        let result = {
            let mut ledger = PgLedger::new(&mut *tx, kind);
            create_reservation(&mut ledger, request, Utc::now()).await
        };

        match result {
            Ok(reservation) => match tx.commit().await {
                Ok(()) => Ok(reservation),
                Err(err) => Err(Self::booking_conflict(pool, request, err).await),
            },
            Err(BookingError::Store(err)) => {
                // The failed statement aborted the transaction.
                drop(tx);
                Err(Self::booking_conflict(pool, request, err).await)
            }
            Err(other) => Err(other),
        }
    }

    /// Change a reservation's status.
    ///
    /// Moving into a blocking status re-runs the conflict check while the
    /// resource row is locked. Returns `Ok(None)` if no reservation of
    /// `kind` has this ID.
    pub async fn update_status(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
        status: ReservationStatus,
    ) -> BookingResult<Option<Reservation>> {
        let mut tx = pool.begin().await.map_err(BookingError::Store)?;

        let Some(current) = Self::lock(&mut *tx, kind, id)
            .await
            .map_err(BookingError::Store)?
        else {
            return Ok(None);
        };

        if current.status == status {
            return Ok(Some(current));
        }

        if current.status.requires_conflict_check(status) {
            sqlx::query("SELECT id FROM resources WHERE id = $1 FOR UPDATE")
                .bind(current.resource_id)
                .execute(&mut *tx)
                .await
                .map_err(BookingError::Store)?;

            let period = DateRange::new(current.start_date, current.end_date)?;
            let existing =
                Self::blocking_overlapping(&mut *tx, current.resource_id, &period, Some(id))
                    .await
                    .map_err(BookingError::Store)?;

            let availability = check_availability(&period, existing);
            if !availability.is_available {
                return Err(BookingError::Conflict {
                    conflicting: availability.conflicting,
                });
            }
        }

        let query = format!(
            "WITH rv AS ( \
                UPDATE reservations SET status_id = $2 WHERE id = $1 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM rv JOIN resources r ON r.id = rv.resource_id"
        );
        let updated = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_one(&mut *tx)
            .await;

        let updated = match updated {
            Ok(row) => row,
            Err(err) => {
                drop(tx);
                return Err(Self::status_conflict(pool, &current, err).await);
            }
        };

        match tx.commit().await {
            Ok(()) => Ok(Some(updated)),
            Err(err) => Err(Self::status_conflict(pool, &current, err).await),
        }
    }

    /// Reprice a reservation from its resource's current unit price.
    ///
    /// Returns `Ok(None)` if no reservation of `kind` has this ID.
    pub async fn recalculate_price(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> BookingResult<Option<Reservation>> {
        let mut tx = pool.begin().await.map_err(BookingError::Store)?;

        let Some(current) = Self::lock(&mut *tx, kind, id)
            .await
            .map_err(BookingError::Store)?
        else {
            return Ok(None);
        };

        let unit_price: Price =
            sqlx::query_scalar("SELECT price_per_unit FROM resources WHERE id = $1")
                .bind(current.resource_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(BookingError::Store)?;

        let quote = DateRange::new(current.start_date, current.end_date)?
            .quote(unit_price, current.participants)?;

        let query = format!(
            "WITH rv AS ( \
                UPDATE reservations SET total_price = $2 WHERE id = $1 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM rv JOIN resources r ON r.id = rv.resource_id"
        );
        let updated = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(quote.total_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(BookingError::Store)?;

        tx.commit().await.map_err(BookingError::Store)?;

        tracing::info!(
            reservation_id = id,
            old_price = current.total_price,
            new_price = updated.total_price,
            "Reservation price recalculated"
        );
        Ok(Some(updated))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find a reservation of `kind` by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} \
             FROM reservations rv \
             JOIN resources r ON r.id = rv.resource_id \
             WHERE rv.id = $1 AND r.kind = $2"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List reservations of `kind`, newest first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        kind: ResourceKind,
        params: &ReservationListParams,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} \
             FROM reservations rv \
             JOIN resources r ON r.id = rv.resource_id \
             WHERE r.kind = $1 \
               AND ($2::SMALLINT IS NULL OR rv.status_id = $2) \
               AND ($3::TEXT IS NULL OR rv.telegram_id = $3) \
               AND ($4::BIGINT IS NULL OR rv.resource_id = $4) \
             ORDER BY rv.created_at DESC, rv.id DESC \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(kind.as_str())
            .bind(params.status.map(ReservationStatus::id))
            .bind(params.telegram_id.as_deref())
            .bind(params.resource_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Blocking reservations of `kind` touching `[start, end]`, optionally
    /// restricted to one resource. Ordered by resource, then start date.
    pub async fn list_blocking_in_window(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Option<DbId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} \
             FROM reservations rv \
             JOIN resources r ON r.id = rv.resource_id \
             WHERE r.kind = $1 \
               AND ($2::BIGINT IS NULL OR rv.resource_id = $2) \
               AND rv.status_id = ANY($3) \
               AND rv.start_date <= $5 \
               AND rv.end_date >= $4 \
             ORDER BY rv.resource_id, rv.start_date, rv.id"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(kind.as_str())
            .bind(resource_id)
            .bind(blocking_status_ids())
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn booking_conflict(
        pool: &PgPool,
        request: &BookingRequest,
        err: sqlx::Error,
    ) -> BookingError<Reservation, sqlx::Error> {
        Self::conflict_or_store(
            pool,
            request.resource_id,
            request.start_date,
            request.end_date,
            None,
            err,
        )
        .await
    }

    async fn status_conflict(
        pool: &PgPool,
        current: &Reservation,
        err: sqlx::Error,
    ) -> BookingError<Reservation, sqlx::Error> {
        Self::conflict_or_store(
            pool,
            current.resource_id,
            current.start_date,
            current.end_date,
            Some(current.id),
            err,
        )
        .await
    }

    /// Lock a reservation row of `kind` for the rest of the transaction.
    async fn lock(
        conn: &mut PgConnection,
        kind: ResourceKind,
        id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} \
             FROM reservations rv \
             JOIN resources r ON r.id = rv.resource_id \
             WHERE rv.id = $1 AND r.kind = $2 \
             FOR UPDATE OF rv"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Turn an exclusion violation into a conflict listing the rows it
    /// collided with. Other errors pass through.
    async fn conflict_or_store(
        pool: &PgPool,
        resource_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<DbId>,
        err: sqlx::Error,
    ) -> BookingError<Reservation, sqlx::Error> {
        if !is_exclusion_violation(&err) {
            return BookingError::Store(err);
        }
        let period = match DateRange::new(start, end) {
            Ok(period) => period,
            Err(core) => return BookingError::Core(core),
        };
        tracing::warn!(resource_id, "Overlap rejected by exclusion constraint");
        match Self::blocking_overlapping(pool, resource_id, &period, exclude_id).await {
            Ok(conflicting) => BookingError::Conflict { conflicting },
            Err(err) => BookingError::Store(err),
        }
    }
}
