//! Convenience result type alias for Artivault.

use crate::error::AppError;

/// A specialized `Result` type for Artivault operations.
pub type AppResult<T> = Result<T, AppError>;
