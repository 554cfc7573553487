//! Student profile model.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::types::{DbId, Timestamp};

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    #[serde(rename = "usuarioId")]
    pub user_id: DbId,
    #[serde(rename = "semestre")]
    pub semester: i32,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
    #[serde(skip)]
    pub updated_at: Timestamp,
}

/// Student joined with the identity of the owning user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentIdentity {
    pub id: DbId,
    #[serde(rename = "usuarioId")]
    pub user_id: DbId,
    #[serde(rename = "semestre")]
    pub semester: i32,
    #[serde(rename = "nombres")]
    pub first_names: String,
    #[serde(rename = "apellidos")]
    pub last_names: String,
    #[serde(rename = "correoInstitucional")]
    pub email: String,
}
