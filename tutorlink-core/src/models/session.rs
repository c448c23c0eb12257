use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fixed length of every instant session. An invariant, not configuration.
pub const SESSION_DURATION_MINUTES: i32 = 15;

/// How long a pending request may wait for a claim before it goes stale.
pub const CLAIM_WINDOW_MINUTES: i64 = 5;

/// Lifecycle state of a dispatch session.
///
/// `completed`, `cancelled` and `expired` are terminal: no transition
/// leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Accepted => "accepted",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Expired
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the session a join marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Student,
    Tutor,
}

/// One instant-tutoring request/match record.
///
/// `tutor_id` and `meeting_url` are unset exactly while the session is
/// `pending`; each timestamp is written at most once, by the transition
/// it is named after.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub subject_id: Uuid,
    pub status: SessionStatus,
    pub duration_minutes: i32,
    pub meeting_url: Option<String>,
    pub tutor_joined_at: Option<DateTime<Utc>>,
    pub student_joined_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
}

impl Session {
    /// True if `user_id` is the owning student or the claiming tutor.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.student_id == user_id || self.tutor_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::Accepted.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(SessionStatus::Expired.is_terminal());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let s = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(s, "\"in_progress\"");
        let back: SessionStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(back, SessionStatus::Expired);
    }

    #[test]
    fn test_is_participant() {
        let student = Uuid::new_v4();
        let tutor = Uuid::new_v4();
        let other = Uuid::new_v4();
        let session = Session {
            id: Uuid::new_v4(),
            student_id: student,
            tutor_id: Some(tutor),
            subject_id: Uuid::new_v4(),
            status: SessionStatus::Accepted,
            duration_minutes: SESSION_DURATION_MINUTES,
            meeting_url: None,
            tutor_joined_at: None,
            student_joined_at: None,
            requested_at: Utc::now(),
            accepted_at: Some(Utc::now()),
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            expired_at: None,
            cancellation_reason: None,
            cancelled_by: None,
        };

        assert!(session.is_participant(student));
        assert!(session.is_participant(tutor));
        assert!(!session.is_participant(other));
    }
}
