//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose roles do not
//! include one of the allowed names. A user may hold several roles; holding
//! any allowed one is enough.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use titulacion_core::error::CoreError;
use titulacion_core::roles::{GRADER_ROLES, REVIEWER_ROLES, ROLE_DIRECTOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then require one of `allowed`. Rejects with 403 otherwise.
async fn require_roles(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[&str],
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.has_any_role(allowed) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Se requiere uno de los roles: {}",
            allowed.join(", ")
        ))));
    }
    Ok(user)
}

/// Requires the `director` role.
///
/// ```ignore
/// async fn director_only(RequireDirector(user): RequireDirector) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireDirector(pub AuthUser);

impl FromRequestParts<AppState> for RequireDirector {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(parts, state, &[ROLE_DIRECTOR])
            .await
            .map(RequireDirector)
    }
}

/// Requires `director`, `coordinador` or `tutor` (proposal reviewers).
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(parts, state, REVIEWER_ROLES)
            .await
            .map(RequireReviewer)
    }
}

/// Requires `tutor` or `director` (progress report graders).
pub struct RequireGrader(pub AuthUser);

impl FromRequestParts<AppState> for RequireGrader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(parts, state, GRADER_ROLES)
            .await
            .map(RequireGrader)
    }
}
