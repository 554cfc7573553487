//! Handlers for the `/avances` resource (weekly progress reports).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use titulacion_core::error::CoreError;
use titulacion_core::progress::{
    check_grade, check_submit, compute_progress, is_overdue, ReportState, ResubmissionPolicy,
    MAX_GRADE, MAX_WEEK, MIN_CONTENT_LENGTH, MIN_GRADE, MIN_WEEK,
};
use titulacion_core::types::{DbId, Timestamp};
use titulacion_db::models::progress_report::{CreateProgressReport, ProgressReport};
use titulacion_db::repositories::progress_report_repo::WEEK_SLOT_CONSTRAINT;
use titulacion_db::repositories::{ProgressReportRepo, ProposalRepo};
use titulacion_db::{is_foreign_key_violation, is_unique_violation};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireGrader;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

/// Body for `POST /avances`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgressReportRequest {
    #[validate(range(min = 1, message = "propuestaId debe ser positivo"))]
    pub propuesta_id: DbId,
    #[validate(range(min = 1))]
    pub tutor_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub director_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub coordinador_id: Option<DbId>,
    #[validate(range(min = MIN_WEEK, max = MAX_WEEK, message = "La semana debe estar entre 1 y 16"))]
    pub semana: i32,
    #[validate(length(min = MIN_CONTENT_LENGTH, message = "El contenido debe ser más descriptivo"))]
    pub contenido: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub porcentaje_avance: Option<f64>,
    pub fecha_inicio: Timestamp,
    pub fecha_entrega: Timestamp,
    pub fecha_entrega_real: Option<Timestamp>,
}

/// Body for `PATCH /avances/{id}/entregar`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[validate(length(min = 1, message = "El contenido es requerido"))]
    pub contenido: String,
    /// Defaults to the time of the request.
    pub fecha_entrega_real: Option<Timestamp>,
}

/// Body for `PATCH /avances/{id}/calificar`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    #[validate(range(min = MIN_GRADE, max = MAX_GRADE, message = "La calificación debe estar entre 0 y 100"))]
    pub calificacion: f64,
    #[serde(default = "default_review_confirmed")]
    pub verificacion_revision: bool,
}

fn default_review_confirmed() -> bool {
    true
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn find_report(pool: &sqlx::PgPool, id: DbId) -> AppResult<ProgressReport> {
    ProgressReportRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Avance",
                id,
            })
        })
}

async fn ensure_proposal_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<()> {
    ProposalRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Propuesta",
            id,
        })?;
    Ok(())
}

fn week_taken(week: i32) -> AppError {
    AppError::Core(CoreError::Forbidden(format!(
        "Ya existe un avance para la semana {week}"
    )))
}

/* --------------------------------------------------------------------------
Handlers
-------------------------------------------------------------------------- */

/// POST /api/avances
///
/// Schedule a week's slot in `pendiente` state. At most one report exists
/// per (proposal, week); the second attempt is Forbidden.
pub async fn create_report(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateProgressReportRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_proposal_exists(&state.pool, input.propuesta_id).await?;

    if ProgressReportRepo::exists_for_week(&state.pool, input.propuesta_id, input.semana).await? {
        return Err(week_taken(input.semana));
    }

    let create = CreateProgressReport {
        proposal_id: input.propuesta_id,
        tutor_id: input.tutor_id,
        director_id: input.director_id,
        coordinator_id: input.coordinador_id,
        week: input.semana,
        content: input.contenido,
        percent_complete: input.porcentaje_avance,
        start_date: input.fecha_inicio,
        due_date: input.fecha_entrega,
        actual_submit_date: input.fecha_entrega_real,
    };

    // The pre-check above can race; the unique key settles it.
    let report = ProgressReportRepo::create(&state.pool, &create)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, WEEK_SLOT_CONSTRAINT) {
                week_taken(create.week)
            } else if is_foreign_key_violation(&e) {
                AppError::Core(CoreError::Missing(
                    "Tutor, director o coordinador no encontrado".into(),
                ))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(
        user_id = auth.user_id,
        proposal_id = report.proposal_id,
        report_id = report.id,
        week = report.week,
        "Progress report created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/avances/{id}
///
/// The report with the student's and tutor's names embedded.
pub async fn get_report(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = ProgressReportRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Avance",
            id,
        })?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/avances/propuesta/{proposal_id}
///
/// Ordered by week ascending.
pub async fn list_for_proposal(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reports = ProgressReportRepo::list_for_proposal(&state.pool, proposal_id).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// PATCH /api/avances/{id}/entregar
///
/// Record the student's submission. Whether an already delivered report may
/// be submitted again depends on the configured [`ResubmissionPolicy`].
pub async fn submit_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    let current = find_report(&state.pool, id).await?;
    let policy = state.config.resubmission;
    check_submit(current.state()?, policy)?;

    let submitted_at = input.fecha_entrega_real.unwrap_or_else(Utc::now);
    let report = ProgressReportRepo::submit(
        &state.pool,
        id,
        &input.contenido,
        submitted_at,
        policy == ResubmissionPolicy::PendingOnly,
    )
    .await?
    .ok_or_else(|| CoreError::Forbidden("El avance ya fue entregado".into()))?;

    tracing::info!(
        user_id = auth.user_id,
        report_id = id,
        previous_state = %current.state,
        "Progress report submitted"
    );

    Ok(Json(DataResponse { data: report }))
}

/// PATCH /api/avances/{id}/calificar
///
/// Grade a delivered report and move it to `revisado` (tutor or director).
pub async fn grade_report(
    RequireGrader(user): RequireGrader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<GradeRequest>,
) -> AppResult<impl IntoResponse> {
    let current = find_report(&state.pool, id).await?;
    check_grade(current.state()?)?;

    // A concurrent grade may have moved the row out of `entregado`.
    let report = ProgressReportRepo::grade(
        &state.pool,
        id,
        input.calificacion,
        input.verificacion_revision,
    )
    .await?
    .ok_or_else(|| {
        CoreError::Forbidden("El avance debe estar entregado para ser calificado".into())
    })?;

    tracing::info!(
        user_id = user.user_id,
        report_id = id,
        grade = input.calificacion,
        "Progress report graded"
    );

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/avances/propuesta/{proposal_id}/atrasados
///
/// Pending reports whose due date has passed, ordered by week.
pub async fn list_overdue(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut overdue = Vec::new();
    for report in ProgressReportRepo::list_for_proposal(&state.pool, proposal_id).await? {
        if is_overdue(report.state()?, report.due_date, now) {
            overdue.push(report);
        }
    }
    Ok(Json(DataResponse { data: overdue }))
}

/// GET /api/avances/propuesta/{proposal_id}/progreso
///
/// Share of delivered (`entregado` or `revisado`) reports, rounded.
pub async fn progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let states = ProgressReportRepo::states_for_proposal(&state.pool, proposal_id)
        .await?
        .iter()
        .map(|s| s.parse::<ReportState>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse {
        data: compute_progress(states),
    }))
}
