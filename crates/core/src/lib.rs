//! Domain rules for the thesis workflow.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers call
//! into these modules to decide whether a status transition is allowed and
//! to derive aggregate values (eligibility, progress).

pub mod error;
pub mod prerequisite;
pub mod progress;
pub mod proposal;
pub mod roles;
pub mod types;
