//! Proposal model, DTOs and the embedded read shape.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::proposal::{ProposalState, ProposalType};
use titulacion_core::types::{DbId, Timestamp};

use super::observation::ObservationWithAuthor;
use super::student::StudentIdentity;

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    #[serde(rename = "estudianteId")]
    pub student_id: DbId,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "numeroIdea")]
    pub idea_number: Option<i32>,
    #[serde(rename = "tema")]
    pub topic: String,
    #[serde(rename = "objetivos")]
    pub objectives: String,
    #[serde(rename = "problematica")]
    pub problem: String,
    #[serde(rename = "areaInvestigacion")]
    pub research_area: Option<String>,
    #[serde(rename = "alcance")]
    pub scope: String,
    #[serde(rename = "archivo")]
    pub attachment: Option<String>,
    #[serde(rename = "fechaLimite")]
    pub deadline: Option<Timestamp>,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: Timestamp,
}

/// DTO for inserting a proposal. New rows always start `pendiente`.
#[derive(Debug, Clone)]
pub struct CreateProposal {
    pub student_id: DbId,
    pub kind: ProposalType,
    pub idea_number: Option<i32>,
    pub topic: String,
    pub objectives: String,
    pub problem: String,
    pub research_area: Option<String>,
    pub scope: String,
    pub attachment: Option<String>,
    pub deadline: Option<Timestamp>,
}

/// Optional equality filters for the staff listing.
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    pub state: Option<ProposalState>,
    pub kind: Option<ProposalType>,
}

/// Proposal with its student identity and observation log embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(rename = "estudiante", skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentIdentity>,
    #[serde(rename = "observaciones")]
    pub observations: Vec<ObservationWithAuthor>,
}
