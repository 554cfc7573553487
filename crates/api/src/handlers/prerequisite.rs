//! Handlers for the `/prerequisitos` resource (the eligibility "semáforo").

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use titulacion_core::error::CoreError;
use titulacion_core::prerequisite::{can_mark, check_validate, is_eligible, MAX_NAME_LENGTH};
use titulacion_core::types::DbId;
use titulacion_db::is_unique_violation;
use titulacion_db::models::prerequisite::{CreatePrerequisite, StudentPrerequisiteDetail};
use titulacion_db::repositories::{PrerequisiteRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireDirector;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request / response types
-------------------------------------------------------------------------- */

/// Body shared by `POST /prerequisitos/marcar` and `POST /prerequisitos/validar`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisitePairRequest {
    #[validate(range(min = 1, message = "estudianteId debe ser positivo"))]
    pub estudiante_id: DbId,
    #[validate(range(min = 1, message = "prerequisitoId debe ser positivo"))]
    pub prerequisito_id: DbId,
}

/// Body for `POST /prerequisitos`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrerequisiteRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Nombre inválido"))]
    pub nombre: String,
    pub descripcion: Option<String>,
}

/// Semaphore snapshot for one student.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub estudiante_id: DbId,
    pub prerequisitos: Vec<StudentPrerequisiteDetail>,
    pub semaforo_verde: bool,
    pub puede_iniciar_titulacion: bool,
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn ensure_student_exists(pool: &sqlx::PgPool, student_id: DbId) -> AppResult<()> {
    StudentRepo::find_by_id(pool, student_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Estudiante",
            id: student_id,
        })?;
    Ok(())
}

/* --------------------------------------------------------------------------
Handlers
-------------------------------------------------------------------------- */

/// GET /api/prerequisitos
///
/// List the reference prerequisites. Public.
pub async fn list_prerequisites(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = PrerequisiteRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/prerequisitos
///
/// Add a prerequisite to the reference list (director only).
pub async fn create_prerequisite(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePrerequisiteRequest>,
) -> AppResult<impl IntoResponse> {
    let create = CreatePrerequisite {
        name: input.nombre,
        description: input.descripcion,
    };

    let prerequisite = PrerequisiteRepo::create(&state.pool, &create)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_prerequisites_name") {
                AppError::Core(CoreError::Conflict(
                    "Ya existe un prerequisito con ese nombre".into(),
                ))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(
        user_id = user.user_id,
        prerequisite_id = prerequisite.id,
        "Prerequisite created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: prerequisite })))
}

/// POST /api/prerequisitos/marcar
///
/// Student self-report. Upserts the pair as `completado`; repeating the call
/// only refreshes the marked-at stamp. A validated pair is left unchanged.
pub async fn mark_completed(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<PrerequisitePairRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_student_exists(&state.pool, input.estudiante_id).await?;
    PrerequisiteRepo::find_by_id(&state.pool, input.prerequisito_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Prerequisito",
            id: input.prerequisito_id,
        })?;

    let current =
        PrerequisiteRepo::find_status(&state.pool, input.estudiante_id, input.prerequisito_id)
            .await?;
    let current_state = current.as_ref().map(|row| row.state()).transpose()?;

    let row = match current {
        // Validated: a self-report never demotes it.
        Some(row) if !can_mark(current_state) => row,
        _ => PrerequisiteRepo::mark_completed(
            &state.pool,
            input.estudiante_id,
            input.prerequisito_id,
        )
        .await?
        .ok_or_else(|| CoreError::Forbidden("El prerequisito ya fue validado".into()))?,
    };

    tracing::info!(
        user_id = auth.user_id,
        student_id = input.estudiante_id,
        prerequisite_id = input.prerequisito_id,
        state = %row.validation_state,
        "Prerequisite marked"
    );

    Ok(Json(DataResponse { data: row }))
}

/// POST /api/prerequisitos/validar
///
/// Director confirmation of a self-reported prerequisite.
pub async fn validate_prerequisite(
    RequireDirector(user): RequireDirector,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<PrerequisitePairRequest>,
) -> AppResult<impl IntoResponse> {
    let current =
        PrerequisiteRepo::find_status(&state.pool, input.estudiante_id, input.prerequisito_id)
            .await?
            .ok_or_else(|| {
                CoreError::Missing("El estudiante no ha marcado este prerequisito".into())
            })?;

    check_validate(current.state()?)?;

    // The SQL guard re-checks `completado`, so a concurrent validation loses here.
    let row = PrerequisiteRepo::validate(&state.pool, input.estudiante_id, input.prerequisito_id)
        .await?
        .ok_or_else(|| CoreError::Forbidden("El prerequisito ya fue validado".into()))?;

    tracing::info!(
        user_id = user.user_id,
        student_id = input.estudiante_id,
        prerequisite_id = input.prerequisito_id,
        "Prerequisite validated"
    );

    Ok(Json(DataResponse { data: row }))
}

/// GET /api/prerequisitos/estado/{student_id}
///
/// All of a student's confirmation rows plus the derived semaphore.
pub async fn eligibility(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_student_exists(&state.pool, student_id).await?;

    let rows = PrerequisiteRepo::list_for_student(&state.pool, student_id).await?;
    let states = rows
        .iter()
        .map(StudentPrerequisiteDetail::state)
        .collect::<Result<Vec<_>, _>>()?;
    let eligible = is_eligible(states, state.config.eligibility);

    Ok(Json(DataResponse {
        data: EligibilityResponse {
            estudiante_id: student_id,
            prerequisitos: rows,
            semaforo_verde: eligible,
            puede_iniciar_titulacion: eligible,
        },
    }))
}
