pub mod service;
pub mod state;
pub mod store;

pub use service::DispatchService;
pub use state::{next_status, Event};
pub use store::SessionStore;
