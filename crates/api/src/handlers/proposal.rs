//! Handlers for the `/propuestas` resource and its observation log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use titulacion_core::error::CoreError;
use titulacion_core::proposal::{
    check_decision, check_idea_quota, check_observation_owner, decision_comment,
    effective_idea_number, ProposalState, ProposalType, MAX_ATTACHMENT_LENGTH,
    MAX_RESEARCH_AREA_LENGTH, MAX_TOPIC_LENGTH, MIN_DESCRIPTIVE_LENGTH, MIN_OBSERVATION_LENGTH,
    MIN_TOPIC_LENGTH,
};
use titulacion_core::types::{DbId, Timestamp};
use titulacion_db::models::proposal::{CreateProposal, ProposalFilter};
use titulacion_db::repositories::{ObservationRepo, ProposalRepo, StudentRepo};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDirector, RequireReviewer};
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

/// Body for `POST /propuestas`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    #[validate(range(min = 1, message = "estudianteId debe ser positivo"))]
    pub estudiante_id: DbId,
    #[serde(default)]
    pub tipo: ProposalType,
    #[validate(range(min = 1, max = 3, message = "numeroIdea debe estar entre 1 y 3"))]
    pub numero_idea: Option<i32>,
    #[validate(length(
        min = MIN_TOPIC_LENGTH,
        max = MAX_TOPIC_LENGTH,
        message = "El tema debe tener entre 10 y 255 caracteres"
    ))]
    pub tema: String,
    #[validate(length(
        min = MIN_DESCRIPTIVE_LENGTH,
        message = "Los objetivos deben tener al menos 20 caracteres"
    ))]
    pub objetivos: String,
    #[validate(length(
        min = MIN_DESCRIPTIVE_LENGTH,
        message = "La problemática debe tener al menos 20 caracteres"
    ))]
    pub problematica: String,
    #[validate(length(max = MAX_RESEARCH_AREA_LENGTH))]
    pub area_investigacion: Option<String>,
    #[validate(length(
        min = MIN_DESCRIPTIVE_LENGTH,
        message = "El alcance debe tener al menos 20 caracteres"
    ))]
    pub alcance: String,
    #[validate(length(max = MAX_ATTACHMENT_LENGTH))]
    pub archivo: Option<String>,
    pub fecha_limite: Option<Timestamp>,
}

/// Body for `PATCH /propuestas/{id}/estado`.
///
/// Derives `Validate` only to go through [`ValidatedJson`]; the comment has
/// no length rule.
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub estado: ProposalState,
    /// Appended as an observation by the deciding director unless empty.
    pub comentario: Option<String>,
}

/// Body for `POST /propuestas/{id}/observaciones`.
#[derive(Debug, Deserialize, Validate)]
pub struct ObservationRequest {
    #[validate(length(
        min = MIN_OBSERVATION_LENGTH,
        message = "El comentario debe tener al menos 10 caracteres"
    ))]
    pub comentario: String,
}

/// Query parameters for `GET /propuestas`.
///
/// Kept as strings so an unknown value is reported through the JSON error
/// envelope instead of the bare query rejection.
#[derive(Debug, Deserialize)]
pub struct ProposalListParams {
    pub estado: Option<String>,
    pub tipo: Option<String>,
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn ensure_proposal_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<()> {
    ProposalRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Propuesta",
            id,
        })?;
    Ok(())
}

/* --------------------------------------------------------------------------
Proposal handlers
-------------------------------------------------------------------------- */

/// POST /api/propuestas
///
/// Create a proposal in `pendiente` state. A student may hold at most three
/// `idea` proposals; `anteproyecto` submissions are unlimited.
pub async fn create_proposal(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateProposalRequest>,
) -> AppResult<impl IntoResponse> {
    StudentRepo::find_by_id(&state.pool, input.estudiante_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Estudiante",
            id: input.estudiante_id,
        })?;

    if input.tipo == ProposalType::Idea {
        let existing =
            ProposalRepo::count_for_student(&state.pool, input.estudiante_id, ProposalType::Idea)
                .await?;
        check_idea_quota(input.tipo, existing)?;
    }

    let create = CreateProposal {
        student_id: input.estudiante_id,
        kind: input.tipo,
        idea_number: effective_idea_number(input.tipo, input.numero_idea),
        topic: input.tema,
        objectives: input.objetivos,
        problem: input.problematica,
        research_area: input.area_investigacion,
        scope: input.alcance,
        attachment: input.archivo,
        deadline: input.fecha_limite,
    };
    let proposal = ProposalRepo::create(&state.pool, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        student_id = proposal.student_id,
        proposal_id = proposal.id,
        kind = %proposal.kind,
        "Proposal created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/propuestas
///
/// Every proposal, optionally filtered by `estado` and `tipo`, newest first.
/// Restricted to reviewers.
pub async fn list_proposals(
    RequireReviewer(_user): RequireReviewer,
    State(state): State<AppState>,
    Query(params): Query<ProposalListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = ProposalFilter {
        state: params
            .estado
            .as_deref()
            .map(str::parse::<ProposalState>)
            .transpose()?,
        kind: params
            .tipo
            .as_deref()
            .map(str::parse::<ProposalType>)
            .transpose()?,
    };
    let proposals = ProposalRepo::list(&state.pool, &filter).await?;
    let details = ProposalRepo::with_details(&state.pool, proposals, true).await?;
    Ok(Json(DataResponse { data: details }))
}

/// GET /api/propuestas/{id}
pub async fn get_proposal(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = ProposalRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Propuesta",
            id,
        })?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/propuestas/estudiante/{student_id}
///
/// A student's proposals, newest first, each with its observations.
pub async fn list_student_proposals(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let proposals = ProposalRepo::list_for_student(&state.pool, student_id).await?;
    let details = ProposalRepo::with_details(&state.pool, proposals, false).await?;
    Ok(Json(DataResponse { data: details }))
}

/// PATCH /api/propuestas/{id}/estado
///
/// Approve or reject a proposal (director only). Any prior state may be
/// overwritten. A non-empty `comentario` is stored as an observation in the
/// same transaction as the state change.
pub async fn set_state(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    check_decision(input.estado)?;

    let (proposal, observation) = ProposalRepo::decide(
        &state.pool,
        id,
        input.estado,
        user.user_id,
        decision_comment(input.comentario.as_deref()),
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Propuesta",
        id,
    })?;

    tracing::info!(
        user_id = user.user_id,
        proposal_id = id,
        state = %input.estado,
        observation_id = ?observation.as_ref().map(|o| o.id),
        "Proposal state changed"
    );

    Ok(Json(DataResponse { data: proposal }))
}

/* --------------------------------------------------------------------------
Observation handlers
-------------------------------------------------------------------------- */

/// POST /api/propuestas/{id}/observaciones
pub async fn add_observation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ObservationRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_proposal_exists(&state.pool, proposal_id).await?;

    let mut conn = state.pool.acquire().await?;
    let created =
        ObservationRepo::create(&mut *conn, proposal_id, auth.user_id, &input.comentario).await?;
    drop(conn);

    let observation = ObservationRepo::find_with_author(&state.pool, created.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Observación",
            id: created.id,
        })?;

    tracing::info!(
        user_id = auth.user_id,
        proposal_id,
        observation_id = observation.id,
        "Observation added"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: observation })))
}

/// GET /api/propuestas/{id}/observaciones
///
/// Oldest first, with author names. An unknown proposal has an empty log.
pub async fn list_observations(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let observations = ObservationRepo::list_for_proposal(&state.pool, proposal_id).await?;
    Ok(Json(DataResponse { data: observations }))
}

/// DELETE /api/propuestas/observaciones/{id}
///
/// Only the author may delete an observation, regardless of role.
pub async fn delete_observation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let observation = ObservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Observación",
            id,
        })?;

    check_observation_owner(observation.user_id, auth.user_id)?;

    ObservationRepo::delete(&state.pool, id).await?;

    tracing::info!(
        user_id = auth.user_id,
        observation_id = id,
        "Observation deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
