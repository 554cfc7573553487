//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Joined "detail" shapes returned by the read endpoints
//!
//! JSON field names follow the public API (Spanish camelCase); Rust field
//! and column names are English.

pub mod observation;
pub mod prerequisite;
pub mod progress_report;
pub mod proposal;
pub mod role;
pub mod student;
pub mod user;
