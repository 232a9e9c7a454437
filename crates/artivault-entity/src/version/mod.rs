//! Version domain entities.

pub mod label;
pub mod model;
pub mod stats;

pub use label::{INITIAL_LABEL, next_label};
pub use model::{NewVersion, Rollback, Version};
pub use stats::VersionStats;
