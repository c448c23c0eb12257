use serde::{Deserialize, Serialize};

/// Rendering view of a subject, served by the external subject catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
}
