// Podcast Catalog - podcast metadata storage
// Copyright (C) 2025 Podcast Catalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Error types for the podcast catalog
//!
//! This module defines error types using thiserror for ergonomic error handling.
//!
//! Constraint failures raised by SQLite (duplicate slug, missing required
//! column, oversized string) are NOT translated into catalog-specific variants:
//! they travel unchanged inside [`CatalogError::SqlxError`]. Use the
//! classifier methods ([`CatalogError::is_unique_violation`] and friends) to
//! inspect them.

use thiserror::Error;

/// Result type alias using our CatalogError type
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the podcast catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    // ===== Database Errors =====

    /// Generic database failure that doesn't come straight from sqlx
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Query could not be built or executed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Row addressed by id or slug does not exist
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ===== Input / State =====

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ===== File / Configuration =====

    #[error("File I/O error: {0}")]
    FileIoError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ===== External Error Conversions =====

    /// Storage-layer failure, propagated unchanged
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::ConfigurationError(err.to_string())
    }
}

// Helper methods for creating common errors
impl CatalogError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        CatalogError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        CatalogError::InvalidInput(message.into())
    }

    fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            CatalogError::SqlxError(sqlx::Error::Database(db)) => Some(&**db),
            _ => None,
        }
    }

    /// True when SQLite rejected a write because of a UNIQUE constraint
    /// (e.g. two podcasts whose slugs normalize to the same value)
    pub fn is_unique_violation(&self) -> bool {
        self.database_error().is_some_and(|db| {
            db.is_unique_violation() || db.message().contains("UNIQUE constraint failed")
        })
    }

    /// True when a required column was written as NULL
    pub fn is_not_null_violation(&self) -> bool {
        self.database_error().is_some_and(|db| {
            matches!(db.kind(), sqlx::error::ErrorKind::NotNullViolation)
                || db.message().contains("NOT NULL constraint failed")
        })
    }

    /// True when a CHECK constraint (string length limits) failed
    pub fn is_check_violation(&self) -> bool {
        self.database_error().is_some_and(|db| {
            db.is_check_violation() || db.message().contains("CHECK constraint failed")
        })
    }

    /// True for missing rows, whether reported by us or by sqlx
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::RecordNotFound(_) | CatalogError::SqlxError(sqlx::Error::RowNotFound)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        if self.is_unique_violation() {
            return "That slug is already taken. Choose a different title or slug.".to_string();
        }
        if self.is_not_null_violation() {
            return "A required field is missing.".to_string();
        }
        if self.is_check_violation() {
            return "One of the fields is longer than the storage layer allows.".to_string();
        }
        match self {
            CatalogError::RecordNotFound(what) => format!("Not found: {}", what),
            CatalogError::ConfigurationError(msg) => {
                format!("Configuration problem: {}. Check your config file and PODCAST_* variables.", msg)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(CatalogError::not_found("podcast 7").is_not_found());
        assert!(CatalogError::SqlxError(sqlx::Error::RowNotFound).is_not_found());
        assert!(!CatalogError::invalid_input("x").is_not_found());
    }

    #[test]
    fn test_non_database_errors_are_not_constraint_violations() {
        let err = CatalogError::QueryFailed("boom".to_string());
        assert!(!err.is_unique_violation());
        assert!(!err.is_not_null_violation());
        assert!(!err.is_check_violation());
    }

    #[test]
    fn test_user_message_for_missing_record() {
        let err = CatalogError::not_found("podcast 'daily-show'");
        assert_eq!(err.user_message(), "Not found: podcast 'daily-show'");
    }
}
