//! # artivault-database
//!
//! Repository traits for all Artivault entities, with a PostgreSQL
//! implementation on `sqlx` and an in-memory implementation for tests and
//! local experiments.

pub mod backend;
pub mod connection;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repositories;

pub use backend::Repositories;
pub use connection::{DatabasePool, PoolStatus};
pub use memory::MemoryStore;
