//! Domain types and pure booking logic for the rental backend.
//!
//! This crate has no internal dependencies so the booking engine can be
//! exercised by the API, the repository layer, and tests alike without a
//! database.

pub mod booking;
pub mod calendar;
pub mod dates;
pub mod error;
pub mod resource;
pub mod types;
