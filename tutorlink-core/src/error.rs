use crate::models::session::SessionStatus;
use thiserror::Error;
use uuid::Uuid;

/// Error and rejection taxonomy for the dispatch engine.
///
/// The domain rejections (`NotFound`, `AlreadyClaimed`, `InvalidTransition`,
/// `Unauthorized`, `ProvisioningFailed`) are expected outcomes returned as
/// values; a lost claim race is not a failure.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Session {0} is no longer available")]
    AlreadyClaimed(Uuid),

    #[error("Cannot {event} a session that is {from}")]
    InvalidTransition {
        from: SessionStatus,
        event: &'static str,
    },

    #[error("User {0} is not a participant in this session")]
    Unauthorized(Uuid),

    #[error("Meeting provisioning failed: {0}")]
    ProvisioningFailed(String),

    #[error("Gateway error: {0}")]
    Gateway(String),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
