pub mod config;
pub mod db;
pub mod error;
pub mod gateways;
pub mod ipc;
pub mod models;

pub use config::TutorlinkConfig;
pub use error::{DispatchError, DispatchResult};
pub use gateways::{
    GatewayError, HttpGateways, MeetingProvisioner, Notifier, ProfileDirectory, SubjectCatalog,
};
