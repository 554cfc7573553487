//! Shared helpers for the HTTP integration tests.
//!
//! Each test binary only uses a subset of these.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use titulacion_api::auth::jwt::JwtConfig;
use titulacion_api::config::ServerConfig;
use titulacion_api::router::build_app_router;
use titulacion_api::state::AppState;
use titulacion_core::prerequisite::EligibilityPolicy;
use titulacion_core::progress::ResubmissionPolicy;

/// Build a test `ServerConfig` with safe defaults and the default policies.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            expiry_mins: 60,
        },
        eligibility: EligibilityPolicy::default(),
        resubmission: ResubmissionPolicy::default(),
    }
}

/// Build the full application router, using the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Same as [`build_test_app`] with a caller-supplied configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a raw (possibly malformed) JSON body.
pub async fn post_raw_auth(app: Router, uri: &str, raw: &'static str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(raw))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Domain helpers
// ---------------------------------------------------------------------------

/// A user registered through the API.
pub struct TestUser {
    pub user_id: i64,
    /// Set for users holding the `estudiante` role.
    pub student_id: Option<i64>,
    pub token: String,
}

/// Register a user with the given roles and return its ids and token.
pub async fn register(app: &Router, email: &str, roles: &[&str]) -> TestUser {
    let body = json!({
        "nombres": "María José",
        "apellidos": "Andrade Vera",
        "correoInstitucional": email,
        "clave": "clave-segura",
        "roles": roles,
    });
    let response = post_json(app.clone(), "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration of {email}");
    let json = body_json(response).await;
    TestUser {
        user_id: json["data"]["usuario"]["id"].as_i64().unwrap(),
        student_id: json["data"]["usuario"]["estudianteId"].as_i64(),
        token: json["data"]["token"].as_str().unwrap().to_string(),
    }
}

pub async fn register_student(app: &Router, email: &str) -> TestUser {
    register(app, email, &["estudiante"]).await
}

pub async fn register_director(app: &Router, email: &str) -> TestUser {
    register(app, email, &["director"]).await
}

/// A valid proposal body for `student_id`.
pub fn proposal_body(student_id: i64, tipo: &str) -> Value {
    json!({
        "estudianteId": student_id,
        "tipo": tipo,
        "tema": "Plataforma de seguimiento de titulación",
        "objetivos": "Digitalizar el seguimiento del proceso de titulación",
        "problematica": "El proceso actual depende de correos y hojas de cálculo",
        "alcance": "Estudiantes y docentes de la carrera de software",
    })
}

/// Create a proposal and return its id.
pub async fn create_proposal(app: &Router, student: &TestUser, tipo: &str) -> i64 {
    let body = proposal_body(student.student_id.unwrap(), tipo);
    let response = post_json_auth(app.clone(), "/api/propuestas", body, &student.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// A valid progress report body for `proposal_id` / `week`.
pub fn report_body(proposal_id: i64, week: i32) -> Value {
    json!({
        "propuestaId": proposal_id,
        "semana": week,
        "contenido": "Revisión del estado del arte y marco teórico",
        "porcentajeAvance": 10,
        "fechaInicio": "2024-03-04T00:00:00Z",
        "fechaEntrega": "2024-03-11T00:00:00Z",
    })
}

/// Create a progress report and return its id.
pub async fn create_report(app: &Router, token: &str, proposal_id: i64, week: i32) -> i64 {
    let response = post_json_auth(
        app.clone(),
        "/api/avances",
        report_body(proposal_id, week),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
