//! Explicit per-user permission management.

pub mod service;

pub use service::PermissionService;
