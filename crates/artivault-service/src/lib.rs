//! # artivault-service
//!
//! Business logic for Artivault's access policy. Each service orchestrates
//! repositories and the content storage provider to implement one concern:
//!
//! - [`AccessEvaluator`] decides who may do what on a file.
//! - [`PermissionService`] manages explicit per-user grants.
//! - [`ShareService`] issues and enforces anonymous share links.
//! - [`VersionService`] keeps the revision history and its current pointer.
//! - [`FileService`] covers upload and file lifecycle.
//!
//! [`ArtifactHub`] wires them together and applies the caller-side policy
//! for the request layer.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod access;
pub mod content;
pub mod context;
pub mod file;
pub mod hub;
pub mod permission;
pub mod share;
pub mod version;

pub use access::{AccessEvaluator, FileAccess};
pub use content::ContentUpload;
pub use context::RequestContext;
pub use file::FileService;
pub use hub::{ArtifactHub, SharedDownload};
pub use permission::PermissionService;
pub use share::{CreateShareRequest, ShareService, generate_token, share_url};
pub use version::VersionService;
