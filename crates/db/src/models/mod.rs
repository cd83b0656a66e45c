//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Filter structs for scoped list queries where the entity is listable

pub mod matches;
pub mod notification;
pub mod package;
pub mod payment;
pub mod ride;
