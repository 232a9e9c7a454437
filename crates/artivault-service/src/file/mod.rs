//! File upload and lifecycle.

pub mod service;

pub use service::FileService;
