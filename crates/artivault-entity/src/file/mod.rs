//! File domain entities.

pub mod content;
pub mod model;

pub use content::{ContentDescriptor, human_readable_size};
pub use model::{File, FileStatus, NewFile, Visibility};
