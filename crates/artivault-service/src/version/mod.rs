//! File version history.

pub mod service;

pub use service::VersionService;
