//! Committee observation model.

use serde::Serialize;
use sqlx::FromRow;
use titulacion_core::types::{DbId, Timestamp};

/// A row from the `observations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Observation {
    pub id: DbId,
    #[serde(rename = "propuestaId")]
    pub proposal_id: DbId,
    #[serde(rename = "usuarioId")]
    pub user_id: DbId,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
}

/// Observation joined with its author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ObservationWithAuthor {
    pub id: DbId,
    #[serde(rename = "propuestaId")]
    pub proposal_id: DbId,
    #[serde(rename = "usuarioId")]
    pub user_id: DbId,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: Timestamp,
    #[serde(rename = "autorNombres")]
    pub author_first_names: String,
    #[serde(rename = "autorApellidos")]
    pub author_last_names: String,
}
