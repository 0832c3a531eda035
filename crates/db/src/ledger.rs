//! Postgres-backed [`ReservationLedger`].
//!
//! A `PgLedger` borrows one connection (normally an open transaction) for
//! the duration of a booking. `unit_price` takes a `FOR UPDATE` lock on the
//! resource row, so concurrent bookings of the same resource queue behind
//! each other until the first transaction commits or rolls back. The
//! `ex_reservations_no_overlap` exclusion constraint backs this up.

use async_trait::async_trait;
use rental_core::booking::{DateRange, ReservationDraft, ReservationLedger};
use rental_core::resource::ResourceKind;
use rental_core::types::{DbId, Price};
use sqlx::PgConnection;

use crate::models::reservation::Reservation;
use crate::repositories::ReservationRepo;

pub struct PgLedger<'c> {
    conn: &'c mut PgConnection,
    kind: ResourceKind,
}

impl<'c> PgLedger<'c> {
    pub fn new(conn: &'c mut PgConnection, kind: ResourceKind) -> Self {
        Self { conn, kind }
    }
}

#[async_trait]
impl<'c> ReservationLedger for PgLedger<'c> {
    type Record = Reservation;
    type Error = sqlx::Error;

    fn entity_name(&self) -> &'static str {
        self.kind.entity_name()
    }

    async fn unit_price(&mut self, resource_id: DbId) -> Result<Option<Price>, sqlx::Error> {
        sqlx::query_scalar::<_, Price>(
            "SELECT price_per_unit FROM resources \
             WHERE id = $1 AND kind = $2 \
             FOR UPDATE",
        )
        .bind(resource_id)
        .bind(self.kind.as_str())
        .fetch_optional(&mut *self.conn)
        .await
    }

    async fn blocking_reservations(
        &mut self,
        resource_id: DbId,
        period: &DateRange,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        ReservationRepo::blocking_overlapping(&mut *self.conn, resource_id, period, None).await
    }

    async fn insert(&mut self, draft: &ReservationDraft) -> Result<Reservation, sqlx::Error> {
        ReservationRepo::insert_draft(&mut *self.conn, draft).await
    }
}
