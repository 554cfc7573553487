//! Weekly progress report ("avance") model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::error::CoreError;
use titulacion_core::progress::ReportState;
use titulacion_core::types::{DbId, Timestamp};

use super::user::PersonName;

/// A row from the `progress_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressReport {
    pub id: DbId,
    #[serde(rename = "propuestaId")]
    pub proposal_id: DbId,
    #[serde(rename = "tutorId")]
    pub tutor_id: Option<DbId>,
    #[serde(rename = "directorId")]
    pub director_id: Option<DbId>,
    #[serde(rename = "coordinadorId")]
    pub coordinator_id: Option<DbId>,
    #[serde(rename = "semana")]
    pub week: i32,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "porcentajeAvance")]
    pub percent_complete: Option<f64>,
    #[serde(rename = "fechaInicio")]
    pub start_date: Timestamp,
    #[serde(rename = "fechaEntrega")]
    pub due_date: Timestamp,
    #[serde(rename = "fechaEntregaReal")]
    pub actual_submit_date: Option<Timestamp>,
    #[serde(rename = "calificacion")]
    pub grade: Option<f64>,
    #[serde(rename = "verificacionRevision")]
    pub review_confirmed: bool,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: Timestamp,
}

impl ProgressReport {
    pub fn state(&self) -> Result<ReportState, CoreError> {
        self.state.parse()
    }
}

/// DTO for scheduling a week's slot. New rows always start `pendiente`.
#[derive(Debug, Clone)]
pub struct CreateProgressReport {
    pub proposal_id: DbId,
    pub tutor_id: Option<DbId>,
    pub director_id: Option<DbId>,
    pub coordinator_id: Option<DbId>,
    pub week: i32,
    pub content: String,
    pub percent_complete: Option<f64>,
    pub start_date: Timestamp,
    pub due_date: Timestamp,
    pub actual_submit_date: Option<Timestamp>,
}

/// Report with the student's and tutor's names embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReportDetail {
    #[serde(flatten)]
    pub report: ProgressReport,
    #[serde(rename = "estudiante", skip_serializing_if = "Option::is_none")]
    pub student: Option<PersonName>,
    #[serde(rename = "tutor", skip_serializing_if = "Option::is_none")]
    pub tutor: Option<PersonName>,
}
