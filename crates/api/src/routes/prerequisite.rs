//! Route definitions for the `/prerequisitos` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::prerequisite;
use crate::state::AppState;

/// Routes mounted at `/prerequisitos`.
///
/// ```text
/// GET  /                        -> list_prerequisites (public)
/// POST /                        -> create_prerequisite (director)
/// POST /marcar                  -> mark_completed
/// POST /validar                 -> validate_prerequisite (director)
/// GET  /estado/{student_id}     -> eligibility
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prerequisite::list_prerequisites).post(prerequisite::create_prerequisite),
        )
        .route("/marcar", post(prerequisite::mark_completed))
        .route("/validar", post(prerequisite::validate_prerequisite))
        .route("/estado/{student_id}", get(prerequisite::eligibility))
}
