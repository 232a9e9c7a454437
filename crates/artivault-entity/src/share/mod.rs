//! Share link domain entities.

pub mod model;
pub mod validity;

pub use model::{NewShareLink, ShareLevel, ShareLink, ShareLinkPatch, ShareStats, ShareStatus};
pub use validity::ShareValidity;
