use crate::models::session::ParticipantRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DispatchRequest {
    Ping,
    Health,
    Create {
        student_id: Uuid,
        subject_id: Uuid,
    },
    Claim {
        session_id: Uuid,
        tutor_id: Uuid,
    },
    Cancel {
        session_id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    },
    Join {
        session_id: Uuid,
        role: ParticipantRole,
    },
    Start {
        session_id: Uuid,
    },
    Complete {
        session_id: Uuid,
    },
    Get {
        session_id: Uuid,
    },
    ListPending {
        subject_id: Option<Uuid>,
    },
    History {
        participant_id: Uuid,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DispatchResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl DispatchResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: "0.1.0".to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: "0.1.0".to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_roundtrips_through_messagepack() {
        let req = DispatchRequest::Claim {
            session_id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
        };
        let bytes = rmp_serde::to_vec_named(&req).unwrap();
        let back: DispatchRequest = rmp_serde::from_slice(&bytes).unwrap();
        match back {
            DispatchRequest::Claim { .. } => {}
            other => panic!("Expected Claim, got {:?}", other),
        }
    }

    #[test]
    fn test_request_json_tag() {
        let req: DispatchRequest = serde_json::from_value(serde_json::json!({
            "action": "list_pending",
            "subject_id": null,
        }))
        .unwrap();
        match req {
            DispatchRequest::ListPending { subject_id } => assert!(subject_id.is_none()),
            other => panic!("Expected ListPending, got {:?}", other),
        }
    }
}
