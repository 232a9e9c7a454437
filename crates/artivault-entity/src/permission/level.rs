//! Permission level and status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use artivault_core::AppError;

/// Permission level for an explicit grant.
///
/// Ordered by privilege: Admin > Write > Read. The derived `Ord` follows
/// declaration order, so `Read < Write < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "permission_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// View and download.
    Read,
    /// Upload new versions, roll back, create share links.
    Write,
    /// Manage grants and delete.
    Admin,
}

impl PermissionLevel {
    /// All levels, lowest first.
    pub const ALL: [PermissionLevel; 3] = [Self::Read, Self::Write, Self::Admin];

    /// Integer rank used for comparisons (READ=1, WRITE=2, ADMIN=3).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Read => 1,
            Self::Write => 2,
            Self::Admin => 3,
        }
    }

    /// Check if this level grants at least the given level.
    pub fn has_at_least(&self, required: PermissionLevel) -> bool {
        self.rank() >= required.rank()
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::validation(format!(
                "Invalid permission level: '{s}'"
            ))),
        }
    }
}

/// Lifecycle of a permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "permission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// In force (subject to expiry).
    Active,
    /// Revoked; kept for audit.
    Revoked,
}

impl PermissionStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            _ => Err(AppError::validation(format!(
                "Invalid permission status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order() {
        assert!(PermissionLevel::Admin > PermissionLevel::Write);
        assert!(PermissionLevel::Write > PermissionLevel::Read);
        assert!(PermissionLevel::Admin.has_at_least(PermissionLevel::Read));
        assert!(!PermissionLevel::Read.has_at_least(PermissionLevel::Write));
        for level in PermissionLevel::ALL {
            assert!(level.has_at_least(level));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "Admin".parse::<PermissionLevel>().ok(),
            Some(PermissionLevel::Admin)
        );
        assert!("owner".parse::<PermissionLevel>().is_err());
    }
}
