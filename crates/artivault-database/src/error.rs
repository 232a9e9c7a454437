//! Mapping from `sqlx` errors to [`AppError`].

use artivault_core::error::{AppError, ErrorKind};

/// SQLSTATE for a serialization failure.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock.
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert a `sqlx` error into an [`AppError`], tagging transient
/// conflicts so callers can retry the whole operation.
pub fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = classify(&err);
    AppError::with_source(kind, format!("{context}: {err}"), err)
}

fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Database(db) => {
            let code = db.code();
            if db.is_unique_violation()
                || matches!(code.as_deref(), Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED))
            {
                ErrorKind::Conflict
            } else {
                ErrorKind::Database
            }
        }
        _ => ErrorKind::Database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = db_error("Failed to find share", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.message.starts_with("Failed to find share"));
    }

    #[test]
    fn test_pool_timeout_is_database() {
        let err = db_error("Failed to list", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(!err.is_retryable());
    }
}
