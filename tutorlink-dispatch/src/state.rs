//! Session state machine.
//!
//! The single source of truth for which lifecycle transitions exist:
//!
//! ```text
//! pending → accepted → in_progress → completed
//!    │          │            │
//!    │          ├── cancel ──┼──────→ cancelled   (pending/accepted only)
//!    │          └── overrun ─┴──────→ expired
//!    └── cancel → cancelled / stale → expired
//! ```
//!
//! The store enforces the same table at the SQL layer with conditional
//! writes; this module is the pure, unit-testable statement of it and the
//! source of `InvalidTransition` rejections.

use tutorlink_core::error::DispatchError;
use tutorlink_core::models::session::SessionStatus;

/// A requested transition on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Claim,
    Cancel,
    Start,
    Complete,
    /// Sweeper: pending longer than the claim window.
    ExpireStale,
    /// Sweeper: accepted/in_progress longer than the session length.
    ExpireOverrun,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Claim => "claim",
            Event::Cancel => "cancel",
            Event::Start => "start",
            Event::Complete => "complete",
            Event::ExpireStale => "expire",
            Event::ExpireOverrun => "expire",
        }
    }
}

/// Resolve the status an event leads to, or reject it.
///
/// Terminal statuses (`completed`, `cancelled`, `expired`) accept nothing.
pub fn next_status(current: SessionStatus, event: Event) -> Result<SessionStatus, DispatchError> {
    use Event::*;
    use SessionStatus::*;

    let next = match (current, event) {
        (Pending, Claim) => Accepted,
        (Pending, Cancel) | (Accepted, Cancel) => Cancelled,
        (Pending, ExpireStale) => Expired,
        (Accepted, Start) => InProgress,
        (Accepted, Complete) | (InProgress, Complete) => Completed,
        (Accepted, ExpireOverrun) | (InProgress, ExpireOverrun) => Expired,
        (from, event) => {
            return Err(DispatchError::InvalidTransition {
                from,
                event: event.name(),
            })
        }
    };

    Ok(next)
}
