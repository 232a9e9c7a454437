//! Trait seams implemented by other Artivault crates.

pub mod storage;

pub use storage::StorageProvider;
