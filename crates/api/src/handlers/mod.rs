//! Request handlers.
//!
//! Every handler receives the [`ResourceKind`](rental_core::resource::ResourceKind)
//! of the route it is mounted under as an `Extension`.

pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod resources;
