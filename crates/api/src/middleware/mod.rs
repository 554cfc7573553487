//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireDirector`] -- Requires the `director` role.
//! - [`rbac::RequireReviewer`] -- Requires `director`, `coordinador` or `tutor`.
//! - [`rbac::RequireGrader`] -- Requires `tutor` or `director`.

pub mod auth;
pub mod rbac;
