use serde::{Deserialize, Serialize};

/// Rendering view of a user, served by the external profile directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub email: String,
}
