//! Handlers for the `/auth` resource (register, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use titulacion_core::error::CoreError;
use titulacion_core::roles::{has_any_role, DEFAULT_STUDENT_SEMESTER, ROLE_STUDENT};
use titulacion_core::types::DbId;
use titulacion_db::is_unique_violation;
use titulacion_db::models::role::Role;
use titulacion_db::models::user::{CreateUser, NewRegistration, User, UserResponse};
use titulacion_db::repositories::{RoleRepo, StudentRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, verify_password, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Nombres debe tener entre 2 y 100 caracteres"))]
    pub nombres: String,
    #[validate(length(min = 2, max = 100, message = "Apellidos debe tener entre 2 y 100 caracteres"))]
    pub apellidos: String,
    #[validate(email(message = "Correo inválido"), length(max = 100, message = "Correo demasiado largo"))]
    pub correo_institucional: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "La clave debe tener entre 6 y 100 caracteres"
    ))]
    pub clave: String,
    #[validate(length(min = 1, message = "Debe asignar al menos un rol"))]
    pub roles: Vec<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Correo inválido"))]
    pub correo_institucional: String,
    #[validate(length(min = 1, message = "La clave es requerida"))]
    pub clave: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub usuario: UserResponse,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create the user, its role links and every role-specific profile row in a
/// single transaction. Returns 201 with the user and a token.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if UserRepo::find_by_email(&state.pool, &input.correo_institucional)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    let mut roles = Vec::with_capacity(input.roles.len());
    for name in &input.roles {
        let role = RoleRepo::find_by_name(&state.pool, name)
            .await?
            .ok_or_else(|| CoreError::Missing(format!("Rol \"{name}\" no encontrado")))?;
        if !roles.iter().any(|r: &Role| r.id == role.id) {
            roles.push(role);
        }
    }

    let password_hash = hash_password(&input.clave)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let registration = NewRegistration {
        user: CreateUser {
            first_names: input.nombres,
            last_names: input.apellidos,
            email: input.correo_institucional,
            password_hash,
        },
        roles,
        student_semester: DEFAULT_STUDENT_SEMESTER,
    };

    let registered = UserRepo::register(&state.pool, &registration)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_users_email") {
                email_taken()
            } else {
                AppError::Database(e)
            }
        })?;

    let token = issue_token(&state, &registered.user, &registered.role_names)?;

    tracing::info!(
        user_id = registered.user.id,
        roles = ?registered.role_names,
        student_id = ?registered.student_id,
        "User registered"
    );

    let usuario =
        UserResponse::from_user(registered.user, registered.role_names, registered.student_id);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AuthPayload { usuario, token },
        }),
    ))
}

/// POST /api/auth/login
///
/// Verify credentials and return the user plus a fresh token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &input.correo_institucional)
        .await?
        .ok_or_else(|| CoreError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let password_valid = verify_password(&input.clave, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    let (role_names, student_id) = load_profile(&state, user.id).await?;
    let token = issue_token(&state, &user, &role_names)?;

    tracing::info!(user_id = user.id, "User logged in");

    let usuario = UserResponse::from_user(user, role_names, student_id);
    Ok(Json(DataResponse {
        data: AuthPayload { usuario, token },
    }))
}

/// GET /api/auth/me
///
/// Echo the caller's current user record.
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Usuario",
            id: auth.user_id,
        })?;

    let (role_names, student_id) = load_profile(&state, user.id).await?;

    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, role_names, student_id),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn email_taken() -> AppError {
    AppError::Core(CoreError::Conflict(
        "El correo institucional ya está registrado".into(),
    ))
}

/// Role names and, for students, the student id.
async fn load_profile(
    state: &AppState,
    user_id: DbId,
) -> AppResult<(Vec<String>, Option<DbId>)> {
    let role_names = RoleRepo::names_for_user(&state.pool, user_id).await?;
    let student_id = if has_any_role(&role_names, &[ROLE_STUDENT]) {
        StudentRepo::find_by_user_id(&state.pool, user_id)
            .await?
            .map(|s| s.id)
    } else {
        None
    };
    Ok((role_names, student_id))
}

fn issue_token(state: &AppState, user: &User, roles: &[String]) -> AppResult<String> {
    generate_access_token(user.id, &user.email, roles, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}
