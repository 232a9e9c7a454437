//! Computed validity of a share link.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a share link can or cannot be used right now.
///
/// Never stored; derived from status, expiry, and the download counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareValidity {
    /// Usable.
    Valid,
    /// Deactivated by its creator or a file admin.
    Revoked,
    /// Past its expiry.
    Expired,
    /// Download quota used up.
    LimitReached,
}

impl ShareValidity {
    /// Whether the link is usable.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Return the validity as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
            Self::LimitReached => "limit_reached",
        }
    }
}

impl fmt::Display for ShareValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
