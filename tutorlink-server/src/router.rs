//! IPC request router — maps `DispatchRequest` variants onto the
//! dispatch service and wraps the outcome in a `DispatchResponse`.
//!
//! Rejections (`NotFound`, `AlreadyClaimed`, ...) are ordinary outcomes
//! here: they become `status: "error"` responses with the error message,
//! never connection failures.

use tutorlink_core::db;
use tutorlink_core::error::DispatchError;
use tutorlink_core::ipc::{DispatchRequest, DispatchResponse};
use tutorlink_core::models::Session;
use tutorlink_dispatch::DispatchService;

fn session_ok(session: Session) -> DispatchResponse {
    DispatchResponse::ok(serde_json::json!({ "session": session }))
}

fn sessions_ok(sessions: Vec<Session>) -> DispatchResponse {
    DispatchResponse::ok(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

fn rejection(err: DispatchError) -> DispatchResponse {
    DispatchResponse::err(err.to_string())
}

pub async fn route_request(service: &DispatchService, req: DispatchRequest) -> DispatchResponse {
    match req {
        DispatchRequest::Ping => DispatchResponse::pong(),

        DispatchRequest::Health => match db::health_check(service.store().pool()).await {
            Ok(version) => DispatchResponse::ok(serde_json::json!({
                "healthy": true,
                "postgresql": version,
            })),
            Err(e) => DispatchResponse::err(format!("Health check failed: {}", e)),
        },

        DispatchRequest::Create {
            student_id,
            subject_id,
        } => match service.create_request(student_id, subject_id).await {
            Ok(session) => session_ok(session),
            Err(e) => rejection(e),
        },

        DispatchRequest::Claim {
            session_id,
            tutor_id,
        } => match service.claim_request(session_id, tutor_id).await {
            Ok(session) => session_ok(session),
            Err(e) => rejection(e),
        },

        DispatchRequest::Cancel {
            session_id,
            actor_id,
            reason,
        } => match service
            .cancel_request(session_id, actor_id, reason.as_deref())
            .await
        {
            Ok(session) => session_ok(session),
            Err(e) => rejection(e),
        },

        DispatchRequest::Join { session_id, role } => {
            match service.mark_joined(session_id, role).await {
                Ok(session) => session_ok(session),
                Err(e) => rejection(e),
            }
        }

        DispatchRequest::Start { session_id } => match service.start_session(session_id).await {
            Ok(session) => session_ok(session),
            Err(e) => rejection(e),
        },

        DispatchRequest::Complete { session_id } => {
            match service.complete_session(session_id).await {
                Ok(session) => session_ok(session),
                Err(e) => rejection(e),
            }
        }

        DispatchRequest::Get { session_id } => match service.get_session(session_id).await {
            Ok(session) => session_ok(session),
            Err(e) => rejection(e),
        },

        DispatchRequest::ListPending { subject_id } => {
            match service.list_pending(subject_id).await {
                Ok(sessions) => sessions_ok(sessions),
                Err(e) => rejection(e),
            }
        }

        DispatchRequest::History { participant_id } => {
            match service.get_history(participant_id).await {
                Ok(sessions) => sessions_ok(sessions),
                Err(e) => rejection(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_carries_message() {
        let resp = rejection(DispatchError::AlreadyClaimed(uuid::Uuid::new_v4()));
        assert_eq!(resp.status, "error");
        assert!(resp.error.unwrap().contains("no longer available"));
    }

    #[test]
    fn test_sessions_ok_includes_count() {
        let resp = sessions_ok(Vec::new());
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.data.unwrap()["count"], 0);
    }
}
