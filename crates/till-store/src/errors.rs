//! Error types for the persistence layer.
//!
//! [`StoreError`] is the single error type returned by store operations. The
//! variant set is small enough for exhaustive matching at the HTTP boundary,
//! which maps the typed not-found and conflict cases to response codes.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Requested category was not found.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Requested product was not found.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Requested inventory record was not found.
    #[error("inventory record not found: {0}")]
    InventoryNotFound(String),

    /// Requested location was not found.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// Username already registered.
    #[error("username taken: {0}")]
    UsernameTaken(String),
}

impl StoreError {
    /// Whether this error is one of the typed not-found cases.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound(_)
                | Self::ProductNotFound(_)
                | Self::InventoryNotFound(_)
                | Self::LocationNotFound(_)
        )
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
    }

    #[test]
    fn not_found_classification() {
        assert!(StoreError::ProductNotFound("prod_x".into()).is_not_found());
        assert!(StoreError::LocationNotFound("loc_x".into()).is_not_found());
        assert!(!StoreError::UsernameTaken("clerk".into()).is_not_found());
    }

    #[test]
    fn migration_error_carries_message() {
        let err = StoreError::Migration {
            message: "v002 failed".into(),
        };
        assert!(err.to_string().contains("v002 failed"));
    }
}
