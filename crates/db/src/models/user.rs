//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::types::{DbId, Timestamp};

use super::role::Role;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
    #[serde(rename = "correoInstitucional")]
    pub email: String,
    /// Resolved role names (e.g. `["estudiante"]`).
    pub roles: Vec<String>,
    /// Set when the user holds the `estudiante` role.
    #[serde(rename = "estudianteId", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<DbId>,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: User, roles: Vec<String>, student_id: Option<DbId>) -> Self {
        Self {
            id: user.id,
            first_names: user.first_names,
            last_names: user.last_names,
            email: user.email,
            roles,
            student_id,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub password_hash: String,
}

/// Everything written by a single registration.
///
/// `roles` must already be resolved against the `roles` table.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user: CreateUser,
    pub roles: Vec<Role>,
    /// Semester stored on the `students` row when an `estudiante` role is present.
    pub student_semester: i32,
}

/// Result of [`crate::repositories::UserRepo::register`].
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    pub role_names: Vec<String>,
    pub student_id: Option<DbId>,
}

/// Display name pair embedded in other resources.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PersonName {
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
}
