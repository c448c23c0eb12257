pub mod profile;
pub mod session;
pub mod subject;

pub use profile::Profile;
pub use session::{
    ParticipantRole, Session, SessionStatus, CLAIM_WINDOW_MINUTES, SESSION_DURATION_MINUTES,
};
pub use subject::Subject;
