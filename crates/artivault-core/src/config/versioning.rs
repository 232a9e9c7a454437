//! Version history configuration.

use serde::{Deserialize, Serialize};

/// Version history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Longest accepted change note, counted in characters.
    #[serde(default = "default_max_change_note_chars")]
    pub max_change_note_chars: usize,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            max_change_note_chars: default_max_change_note_chars(),
        }
    }
}

fn default_max_change_note_chars() -> usize {
    1000
}
