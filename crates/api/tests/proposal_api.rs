//! HTTP-level integration tests for proposals and their observations.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, patch_json_auth, post_json_auth, proposal_body,
};
use serde_json::json;
use sqlx::PgPool;

const COMMENT: &str = "Delimitar mejor el alcance del sistema propuesto";

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_idea_is_pending(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let mut body = proposal_body(student.student_id.unwrap(), "idea");
    body["numeroIdea"] = json!(2);
    let response = post_json_auth(app, "/api/propuestas", body, &student.token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["estado"], "pendiente");
    assert_eq!(json["data"]["tipo"], "idea");
    assert_eq!(json["data"]["numeroIdea"], 2);
}

/// The fourth idea is refused; drafts are not counted.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_idea_quota(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let student_id = student.student_id.unwrap();

    let mut created = Vec::new();
    for _ in 0..3 {
        created.push(common::create_proposal(&app, &student, "idea").await);
    }

    let fourth = post_json_auth(
        app.clone(),
        "/api/propuestas",
        proposal_body(student_id, "idea"),
        &student.token,
    )
    .await;
    assert_eq!(fourth.status(), StatusCode::FORBIDDEN);
    let json = body_json(fourth).await;
    assert_eq!(json["error"], "Ya has registrado 3 ideas de propuesta");

    for _ in 0..2 {
        created.push(common::create_proposal(&app, &student, "anteproyecto").await);
    }

    let uri = format!("/api/propuestas/estudiante/{student_id}");
    let listed = body_json(get_auth(app, &uri, &student.token).await).await;
    let listed: Vec<i64> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    created.reverse();
    assert_eq!(listed, created);
}

/// Drafts never carry an idea number.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_draft_drops_idea_number(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let mut body = proposal_body(student.student_id.unwrap(), "anteproyecto");
    body["numeroIdea"] = json!(1);
    let response = post_json_auth(app, "/api/propuestas", body, &student.token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["numeroIdea"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_validation_details(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let mut body = proposal_body(student.student_id.unwrap(), "idea");
    body["tema"] = json!("Corto");
    body["numeroIdea"] = json!(4);
    let response = post_json_auth(app, "/api/propuestas", body, &student.token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let paths: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["numeroIdea", "tema"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_for_unknown_student_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let response = post_json_auth(
        app,
        "/api/propuestas",
        proposal_body(9999, "idea"),
        &student.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_staff_list_requires_reviewer(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let response = get_auth(app, "/api/propuestas", &student.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_staff_list_filters(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;

    let idea = common::create_proposal(&app, &student, "idea").await;
    common::create_proposal(&app, &student, "idea").await;
    let draft = common::create_proposal(&app, &student, "anteproyecto").await;

    let decided = patch_json_auth(
        app.clone(),
        &format!("/api/propuestas/{idea}/estado"),
        json!({ "estado": "aprobada" }),
        &director.token,
    )
    .await;
    assert_eq!(decided.status(), StatusCode::OK);

    let all = body_json(get_auth(app.clone(), "/api/propuestas", &director.token).await).await;
    let all = all["data"].as_array().unwrap().clone();
    assert_eq!(all.len(), 3);
    // Newest first, with the student's identity embedded.
    assert_eq!(all[0]["id"], draft);
    assert_eq!(all[0]["estudiante"]["correoInstitucional"], "est@uleam.edu.ec");

    let approved = body_json(
        get_auth(app.clone(), "/api/propuestas?estado=aprobada", &director.token).await,
    )
    .await;
    assert_eq!(approved["data"].as_array().unwrap().len(), 1);
    assert_eq!(approved["data"][0]["id"], idea);

    let pending_ideas = body_json(
        get_auth(
            app,
            "/api/propuestas?estado=pendiente&tipo=idea",
            &director.token,
        )
        .await,
    )
    .await;
    assert_eq!(pending_ideas["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_staff_list_rejects_unknown_filter(pool: PgPool) {
    let app = common::build_test_app(pool);
    let tutor = common::register(&app, "tutor@uleam.edu.ec", &["tutor"]).await;

    let response = get_auth(app, "/api/propuestas?estado=archivada", &tutor.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_unknown_proposal_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let response = get_auth(app, "/api/propuestas/9999", &student.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An unknown student simply has no proposals.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_for_unknown_student_is_empty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let response = get_auth(app, "/api/propuestas/estudiante/9999", &student.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}

// ---------------------------------------------------------------------------
// Decisions and observations
// ---------------------------------------------------------------------------

/// Register, pitch an idea, approve it with a comment, read the log back.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_decision_with_comment_end_to_end(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/propuestas/{proposal_id}/estado"),
        json!({ "estado": "aprobada", "comentario": COMMENT }),
        &director.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["estado"], "aprobada");

    let observations = body_json(
        get_auth(
            app.clone(),
            &format!("/api/propuestas/{proposal_id}/observaciones"),
            &student.token,
        )
        .await,
    )
    .await;
    let observations = observations["data"].as_array().unwrap().clone();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0]["comentario"], COMMENT);
    assert_eq!(observations[0]["usuarioId"], director.user_id);
    assert_eq!(observations[0]["autorNombres"], "María José");

    let detail = body_json(
        get_auth(
            app,
            &format!("/api/propuestas/{proposal_id}"),
            &student.token,
        )
        .await,
    )
    .await;
    assert_eq!(detail["data"]["observaciones"].as_array().unwrap().len(), 1);
}

/// A rejected proposal may later be approved.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_decision_can_be_reversed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "anteproyecto").await;
    let uri = format!("/api/propuestas/{proposal_id}/estado");

    let rejected =
        patch_json_auth(app.clone(), &uri, json!({ "estado": "rechazada" }), &director.token).await;
    assert_eq!(body_json(rejected).await["data"]["estado"], "rechazada");

    let approved =
        patch_json_auth(app, &uri, json!({ "estado": "aprobada" }), &director.token).await;
    assert_eq!(body_json(approved).await["data"]["estado"], "aprobada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_decision_rules(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;
    let uri = format!("/api/propuestas/{proposal_id}/estado");

    let by_student =
        patch_json_auth(app.clone(), &uri, json!({ "estado": "aprobada" }), &student.token).await;
    assert_eq!(by_student.status(), StatusCode::FORBIDDEN);

    let back_to_pending =
        patch_json_auth(app.clone(), &uri, json!({ "estado": "pendiente" }), &director.token)
            .await;
    assert_eq!(back_to_pending.status(), StatusCode::BAD_REQUEST);

    let unknown = patch_json_auth(
        app,
        "/api/propuestas/9999/estado",
        json!({ "estado": "aprobada" }),
        &director.token,
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

/// An empty decision comment is skipped; a short one is logged as given.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_decision_comment_has_no_length_rule(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;
    let uri = format!("/api/propuestas/{proposal_id}/estado");
    let log_uri = format!("/api/propuestas/{proposal_id}/observaciones");

    let empty = patch_json_auth(
        app.clone(),
        &uri,
        json!({ "estado": "aprobada", "comentario": "" }),
        &director.token,
    )
    .await;
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(body_json(empty).await["data"]["estado"], "aprobada");
    let log = body_json(get_auth(app.clone(), &log_uri, &student.token).await).await;
    assert!(log["data"].as_array().unwrap().is_empty());

    let short = patch_json_auth(
        app.clone(),
        &uri,
        json!({ "estado": "rechazada", "comentario": "OK" }),
        &director.token,
    )
    .await;
    assert_eq!(short.status(), StatusCode::OK);
    assert_eq!(body_json(short).await["data"]["estado"], "rechazada");
    let log = body_json(get_auth(app, &log_uri, &student.token).await).await;
    let log = log["data"].as_array().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["comentario"], "OK");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_short_observation_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;

    let response = post_json_auth(
        app,
        &format!("/api/propuestas/{proposal_id}/observaciones"),
        json!({ "comentario": "breve" }),
        &student.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"][0]["path"], "comentario");
}

/// Length is counted in characters of the raw text, padding included.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_observation_length_counts_raw_characters(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;
    let uri = format!("/api/propuestas/{proposal_id}/observaciones");

    // 14 characters, 8 of them visible.
    let padded = post_json_auth(
        app.clone(),
        &uri,
        json!({ "comentario": "   nueve ch   " }),
        &student.token,
    )
    .await;
    assert_eq!(padded.status(), StatusCode::CREATED);
    assert_eq!(body_json(padded).await["data"]["comentario"], "   nueve ch   ");

    // 10 characters, 20 bytes.
    let accented =
        post_json_auth(app, &uri, json!({ "comentario": "áéíóúáéíóú" }), &student.token).await;
    assert_eq!(accented.status(), StatusCode::CREATED);
}

/// The log reads oldest first, and each proposal in a student listing
/// carries only its own observations.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_observations_ordered_and_attached_per_proposal(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let tutor = common::register(&app, "tutor@uleam.edu.ec", &["tutor"]).await;
    let first = common::create_proposal(&app, &student, "idea").await;
    let second = common::create_proposal(&app, &student, "idea").await;

    let comments = [
        (first, "Primera observación de la idea uno"),
        (second, "Única observación de la idea dos"),
        (first, "Segunda observación de la idea uno"),
        (first, "Tercera observación de la idea uno"),
    ];
    for (proposal_id, comment) in comments {
        let response = post_json_auth(
            app.clone(),
            &format!("/api/propuestas/{proposal_id}/observaciones"),
            json!({ "comentario": comment }),
            &tutor.token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let log = body_json(
        get_auth(
            app.clone(),
            &format!("/api/propuestas/{first}/observaciones"),
            &student.token,
        )
        .await,
    )
    .await;
    let log: Vec<&str> = log["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["comentario"].as_str().unwrap())
        .collect();
    assert_eq!(
        log,
        vec![
            "Primera observación de la idea uno",
            "Segunda observación de la idea uno",
            "Tercera observación de la idea uno",
        ]
    );

    let student_id = student.student_id.unwrap();
    let listed = body_json(
        get_auth(
            app,
            &format!("/api/propuestas/estudiante/{student_id}"),
            &student.token,
        )
        .await,
    )
    .await;
    let listed = listed["data"].as_array().unwrap();
    assert_eq!(listed[0]["id"], second);
    assert_eq!(listed[1]["id"], first);

    let second_log = listed[0]["observaciones"].as_array().unwrap();
    assert_eq!(second_log.len(), 1);
    assert_eq!(second_log[0]["comentario"], "Única observación de la idea dos");
    assert_eq!(second_log[0]["propuestaId"], second);

    let first_log: Vec<&str> = listed[1]["observaciones"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["comentario"].as_str().unwrap())
        .collect();
    assert_eq!(first_log, log);
}

/// Only the author deletes an observation; being a director does not help.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_observation_delete_is_author_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;
    let tutor = common::register(&app, "tutor@uleam.edu.ec", &["tutor"]).await;
    let director = common::register_director(&app, "dir@uleam.edu.ec").await;
    let proposal_id = common::create_proposal(&app, &student, "idea").await;

    let created = post_json_auth(
        app.clone(),
        &format!("/api/propuestas/{proposal_id}/observaciones"),
        json!({ "comentario": COMMENT }),
        &tutor.token,
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    assert_eq!(created["data"]["autorApellidos"], "Andrade Vera");
    let observation_id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/propuestas/observaciones/{observation_id}");

    let by_director = delete_auth(app.clone(), &uri, &director.token).await;
    assert_eq!(by_director.status(), StatusCode::FORBIDDEN);

    let by_author = delete_auth(app.clone(), &uri, &tutor.token).await;
    assert_eq!(by_author.status(), StatusCode::NO_CONTENT);

    let again = delete_auth(app, &uri, &tutor.token).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_observations_for_unknown_proposal_are_empty(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = common::register_student(&app, "est@uleam.edu.ec").await;

    let response = get_auth(app, "/api/propuestas/9999/observaciones", &student.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}
