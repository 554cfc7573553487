//! Route definitions for the `/avances` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::progress_report;
use crate::state::AppState;

/// Routes mounted at `/avances`.
///
/// ```text
/// POST  /                                      -> create_report
/// GET   /{id}                                  -> get_report
/// PATCH /{id}/entregar                         -> submit_report
/// PATCH /{id}/calificar                        -> grade_report (tutor, director)
/// GET   /propuesta/{proposal_id}               -> list_for_proposal
/// GET   /propuesta/{proposal_id}/atrasados     -> list_overdue
/// GET   /propuesta/{proposal_id}/progreso      -> progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(progress_report::create_report))
        .route("/{id}", get(progress_report::get_report))
        .route("/{id}/entregar", patch(progress_report::submit_report))
        .route("/{id}/calificar", patch(progress_report::grade_report))
        .route(
            "/propuesta/{proposal_id}",
            get(progress_report::list_for_proposal),
        )
        .route(
            "/propuesta/{proposal_id}/atrasados",
            get(progress_report::list_overdue),
        )
        .route(
            "/propuesta/{proposal_id}/progreso",
            get(progress_report::progress),
        )
}
