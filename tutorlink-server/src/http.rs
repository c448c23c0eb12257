//! Tutorlink HTTP REST API
//!
//! Axum-based HTTP server that exposes the dispatch operations over HTTP.
//! Runs alongside the Unix socket IPC server on port 8780 (configurable).
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function returning `(StatusCode, serde_json::Value)`. The
//! inner functions are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health                      — health check with DB status
//! - GET  /version                     — server version info
//! - POST /sessions                    — create a help request
//! - GET  /sessions/:id                — session detail, rendered with
//!                                       profile/subject lookups
//! - POST /sessions/:id/claim          — tutor claims a pending request
//! - POST /sessions/:id/cancel         — participant cancels
//! - POST /sessions/:id/join           — best-effort join marker
//! - POST /sessions/:id/start          — accepted → in_progress
//! - POST /sessions/:id/complete       — accepted/in_progress → completed
//! - GET  /sessions/pending            — queue view (optional ?subject_id=)
//! - GET  /history/:participant_id     — everything a user took part in

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use tutorlink_core::error::DispatchError;
use tutorlink_core::gateways::{ProfileDirectory, SubjectCatalog};
use tutorlink_core::models::session::ParticipantRole;
use tutorlink_core::TutorlinkConfig;
use tutorlink_dispatch::DispatchService;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub service: DispatchService,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub subjects: Arc<dyn SubjectCatalog>,
    pub socket_path: String,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/sessions", post(create_handler))
        .route("/sessions/pending", get(pending_handler))
        .route("/sessions/:id", get(detail_handler))
        .route("/sessions/:id/claim", post(claim_handler))
        .route("/sessions/:id/cancel", post(cancel_handler))
        .route("/sessions/:id/join", post(join_handler))
        .route("/sessions/:id/start", post(start_handler))
        .route("/sessions/:id/complete", post(complete_handler))
        .route("/history/:participant_id", get(history_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    config: TutorlinkConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Tutorlink HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub student_id: Uuid,
    pub subject_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub tutor_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub actor_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub role: ParticipantRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuery {
    pub subject_id: Option<Uuid>,
}

// ============================================================================
// Rejection → HTTP mapping
// ============================================================================

/// Rejections are expected outcomes; each maps to a stable status code.
pub fn error_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
        DispatchError::AlreadyClaimed(_) | DispatchError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        DispatchError::Unauthorized(_) => StatusCode::FORBIDDEN,
        DispatchError::ProvisioningFailed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &DispatchError) -> serde_json::Value {
    serde_json::json!({
        "error": err.to_string(),
        "status": "error",
    })
}

fn session_response(
    result: Result<tutorlink_core::models::Session, DispatchError>,
) -> (StatusCode, serde_json::Value) {
    match result {
        Ok(session) => (
            StatusCode::OK,
            serde_json::json!({ "session": session, "status": "ok" }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — queries DB and returns (status_code, json_body).
pub async fn health_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    let pg_ver = match tutorlink_core::db::health_check(state.service.store().pool()).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                }),
            );
        }
    };

    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "postgresql": pg_ver,
            "socket": state.socket_path,
        }),
    )
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "tutorlink/1",
    })
}

pub async fn create_inner(
    service: &DispatchService,
    req: CreateRequest,
) -> (StatusCode, serde_json::Value) {
    match service.create_request(req.student_id, req.subject_id).await {
        Ok(session) => (
            StatusCode::CREATED,
            serde_json::json!({ "session": session, "status": "ok" }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

pub async fn claim_inner(
    service: &DispatchService,
    session_id: Uuid,
    req: ClaimRequest,
) -> (StatusCode, serde_json::Value) {
    session_response(service.claim_request(session_id, req.tutor_id).await)
}

pub async fn cancel_inner(
    service: &DispatchService,
    session_id: Uuid,
    req: CancelRequest,
) -> (StatusCode, serde_json::Value) {
    session_response(
        service
            .cancel_request(session_id, req.actor_id, req.reason.as_deref())
            .await,
    )
}

pub async fn join_inner(
    service: &DispatchService,
    session_id: Uuid,
    req: JoinRequest,
) -> (StatusCode, serde_json::Value) {
    session_response(service.mark_joined(session_id, req.role).await)
}

pub async fn start_inner(
    service: &DispatchService,
    session_id: Uuid,
) -> (StatusCode, serde_json::Value) {
    session_response(service.start_session(session_id).await)
}

pub async fn complete_inner(
    service: &DispatchService,
    session_id: Uuid,
) -> (StatusCode, serde_json::Value) {
    session_response(service.complete_session(session_id).await)
}

pub async fn pending_inner(
    service: &DispatchService,
    subject_id: Option<Uuid>,
) -> (StatusCode, serde_json::Value) {
    match service.list_pending(subject_id).await {
        Ok(sessions) => (
            StatusCode::OK,
            serde_json::json!({
                "sessions": sessions,
                "count": sessions.len(),
                "status": "ok",
            }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

pub async fn history_inner(
    service: &DispatchService,
    participant_id: Uuid,
) -> (StatusCode, serde_json::Value) {
    match service.get_history(participant_id).await {
        Ok(sessions) => (
            StatusCode::OK,
            serde_json::json!({
                "sessions": sessions,
                "count": sessions.len(),
                "status": "ok",
            }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

/// Session detail, rendered with collaborator lookups. Lookups are
/// best-effort for display only; their failure never fails the request.
pub async fn detail_inner(state: &HttpState, session_id: Uuid) -> (StatusCode, serde_json::Value) {
    let session = match state.service.get_session(session_id).await {
        Ok(session) => session,
        Err(e) => return (error_status(&e), error_body(&e)),
    };

    let student = state.profiles.lookup(session.student_id).await.ok();
    let tutor = match session.tutor_id {
        Some(tutor_id) => state.profiles.lookup(tutor_id).await.ok(),
        None => None,
    };
    let subject = state.subjects.subject(session.subject_id).await.ok();

    (
        StatusCode::OK,
        serde_json::json!({
            "session": session,
            "student": student,
            "tutor": tutor,
            "subject": subject,
            "status": "ok",
        }),
    )
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn create_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<CreateRequest>,
) -> impl IntoResponse {
    let (status, body) = create_inner(&state.service, req).await;
    (status, Json(body))
}

pub async fn detail_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let (status, body) = detail_inner(&state, id).await;
    (status, Json(body))
}

pub async fn claim_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ClaimRequest>,
) -> impl IntoResponse {
    let (status, body) = claim_inner(&state.service, id, req).await;
    (status, Json(body))
}

pub async fn cancel_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    let (status, body) = cancel_inner(&state.service, id, req).await;
    (status, Json(body))
}

pub async fn join_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<JoinRequest>,
) -> impl IntoResponse {
    let (status, body) = join_inner(&state.service, id, req).await;
    (status, Json(body))
}

pub async fn start_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let (status, body) = start_inner(&state.service, id).await;
    (status, Json(body))
}

pub async fn complete_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let (status, body) = complete_inner(&state.service, id).await;
    (status, Json(body))
}

pub async fn pending_handler(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<PendingQuery>,
) -> impl IntoResponse {
    let (status, body) = pending_inner(&state.service, query.subject_id).await;
    (status, Json(body))
}

pub async fn history_handler(
    State(state): State<Arc<HttpState>>,
    Path(participant_id): Path<Uuid>,
) -> impl IntoResponse {
    let (status, body) = history_inner(&state.service, participant_id).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests — pure pieces that need no DB or network
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tutorlink_core::models::session::SessionStatus;

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "tutorlink/1", "protocol must be tutorlink/1");
    }

    #[test]
    fn test_error_status_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(
            error_status(&DispatchError::NotFound(id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&DispatchError::AlreadyClaimed(id)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&DispatchError::InvalidTransition {
                from: SessionStatus::Expired,
                event: "claim",
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&DispatchError::Unauthorized(id)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_status(&DispatchError::ProvisioningFailed("down".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = error_body(&DispatchError::AlreadyClaimed(Uuid::new_v4()));
        assert_eq!(body["status"], "error");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("no longer available"));
    }

    #[test]
    fn test_claim_request_deserializes_camel_case() {
        let req: ClaimRequest = serde_json::from_value(serde_json::json!({
            "tutorId": "8c0e6a3e-7c29-4dd5-9f14-2f6f7b9f2b7a"
        }))
        .unwrap();
        assert!(!req.tutor_id.is_nil());
    }

    #[test]
    fn test_join_request_role_values() {
        let req: JoinRequest = serde_json::from_value(serde_json::json!({"role": "tutor"})).unwrap();
        assert_eq!(req.role, ParticipantRole::Tutor);

        let req: JoinRequest =
            serde_json::from_value(serde_json::json!({"role": "student"})).unwrap();
        assert_eq!(req.role, ParticipantRole::Student);
    }
}
