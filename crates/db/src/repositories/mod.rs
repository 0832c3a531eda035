//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every query is scoped to one
//! [`ResourceKind`](rental_core::resource::ResourceKind).

pub mod catalog_repo;
pub mod reservation_repo;
pub mod resource_repo;

pub use catalog_repo::CatalogRepo;
pub use reservation_repo::{BookingResult, ReservationRepo};
pub use resource_repo::ResourceRepo;
