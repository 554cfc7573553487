//! Prerequisite reference data and per-student confirmation rows.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::error::CoreError;
use titulacion_core::prerequisite::ValidationState;
use titulacion_core::types::{DbId, Timestamp};

/// A row from the `prerequisites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prerequisite {
    pub id: DbId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(skip)]
    pub created_at: Timestamp,
    #[serde(skip)]
    pub updated_at: Timestamp,
}

/// DTO for creating a prerequisite.
#[derive(Debug, Clone)]
pub struct CreatePrerequisite {
    pub name: String,
    pub description: Option<String>,
}

/// A row from the `student_prerequisites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentPrerequisite {
    pub id: DbId,
    #[serde(rename = "estudianteId")]
    pub student_id: DbId,
    #[serde(rename = "prerequisitoId")]
    pub prerequisite_id: DbId,
    #[serde(rename = "estadoValidacion")]
    pub validation_state: String,
    #[serde(rename = "fechaMarcado")]
    pub marked_at: Option<Timestamp>,
    #[serde(rename = "fechaValidacion")]
    pub validated_at: Option<Timestamp>,
    #[serde(skip)]
    pub created_at: Timestamp,
    #[serde(skip)]
    pub updated_at: Timestamp,
}

impl StudentPrerequisite {
    pub fn state(&self) -> Result<ValidationState, CoreError> {
        self.validation_state.parse()
    }
}

/// Confirmation row joined with its prerequisite (semaphore listing).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentPrerequisiteDetail {
    pub id: DbId,
    #[serde(rename = "estudianteId")]
    pub student_id: DbId,
    #[serde(rename = "prerequisitoId")]
    pub prerequisite_id: DbId,
    #[serde(rename = "estadoValidacion")]
    pub validation_state: String,
    #[serde(rename = "fechaMarcado")]
    pub marked_at: Option<Timestamp>,
    #[serde(rename = "fechaValidacion")]
    pub validated_at: Option<Timestamp>,
    #[serde(rename = "nombrePrerequisito")]
    pub prerequisite_name: String,
    #[serde(rename = "descripcionPrerequisito")]
    pub prerequisite_description: Option<String>,
}

impl StudentPrerequisiteDetail {
    pub fn state(&self) -> Result<ValidationState, CoreError> {
        self.validation_state.parse()
    }
}
