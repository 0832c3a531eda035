//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - List/filter parameter structs where the entity is listable

pub mod catalog;
pub mod reservation;
pub mod resource;
