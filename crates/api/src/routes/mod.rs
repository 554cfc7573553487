pub mod auth;
pub mod health;
pub mod prerequisite;
pub mod progress_report;
pub mod proposal;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         caller identity
///
/// /prerequisitos                                   list (public), create (director)
/// /prerequisitos/marcar                            student self-report
/// /prerequisitos/validar                           validate (director)
/// /prerequisitos/estado/{student_id}               semaphore snapshot
///
/// /propuestas                                      create, list (reviewers)
/// /propuestas/{id}                                 get
/// /propuestas/estudiante/{student_id}              list by student
/// /propuestas/{id}/estado                          approve/reject (director)
/// /propuestas/{id}/observaciones                   add, list
/// /propuestas/observaciones/{id}                   delete (author only)
///
/// /avances                                         create
/// /avances/{id}                                    get
/// /avances/{id}/entregar                           submit
/// /avances/{id}/calificar                          grade (tutor, director)
/// /avances/propuesta/{proposal_id}                 list by proposal
/// /avances/propuesta/{proposal_id}/atrasados       overdue
/// /avances/propuesta/{proposal_id}/progreso        progress summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/prerequisitos", prerequisite::router())
        .nest("/propuestas", proposal::router())
        .nest("/avances", progress_report::router())
}
