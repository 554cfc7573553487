//! Route definitions for the `/propuestas` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::proposal;
use crate::state::AppState;

/// Routes mounted at `/propuestas`.
///
/// ```text
/// POST   /                            -> create_proposal
/// GET    /                            -> list_proposals (reviewers)
/// GET    /{id}                        -> get_proposal
/// GET    /estudiante/{student_id}     -> list_student_proposals
/// PATCH  /{id}/estado                 -> set_state (director)
/// POST   /{id}/observaciones          -> add_observation
/// GET    /{id}/observaciones          -> list_observations
/// DELETE /observaciones/{id}          -> delete_observation (author only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(proposal::list_proposals).post(proposal::create_proposal),
        )
        .route("/{id}", get(proposal::get_proposal))
        .route(
            "/estudiante/{student_id}",
            get(proposal::list_student_proposals),
        )
        .route("/{id}/estado", patch(proposal::set_state))
        .route(
            "/{id}/observaciones",
            get(proposal::list_observations).post(proposal::add_observation),
        )
        .route("/observaciones/{id}", delete(proposal::delete_observation))
}
