//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Share link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Public base URL that share tokens are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/s".to_string()
}
