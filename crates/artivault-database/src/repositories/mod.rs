//! Repository traits for all Artivault entities.
//!
//! Two implementations are provided: PostgreSQL in [`crate::postgres`] and
//! in-memory in [`crate::memory`]. Every method that spans more than one
//! row is atomic in both.

pub mod file;
pub mod permission;
pub mod share;
pub mod version;

pub use file::FileRepository;
pub use permission::PermissionRepository;
pub use share::ShareRepository;
pub use version::VersionRepository;
