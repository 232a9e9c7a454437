//! PostgreSQL repository implementations.

pub mod file;
pub mod permission;
pub mod share;
pub mod version;

pub use file::PgFileRepository;
pub use permission::PgPermissionRepository;
pub use share::PgShareRepository;
pub use version::PgVersionRepository;
