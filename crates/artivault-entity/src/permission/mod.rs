//! Permission domain entities.

pub mod level;
pub mod model;

pub use level::{PermissionLevel, PermissionStatus};
pub use model::{NewPermission, Permission, PermissionPatch, PermissionStats};
