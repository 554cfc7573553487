pub mod auth;
pub mod health;
pub mod prerequisite;
pub mod progress_report;
pub mod proposal;
