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


//! Database connection and management
//!
//! This module handles database connection pooling, initialization, and schema
//! setup. The schema is applied explicitly when a [`Database`] is constructed;
//! nothing registers tables behind the caller's back.
//!
//! # SQLite Configuration
//! - WAL mode for better concurrency
//! - Foreign keys enabled (needed for `media.podcast_id ON DELETE SET NULL`)
//! - Normal synchronous mode (balance safety/speed)

use crate::config::DatabaseSettings;
use crate::error::{CatalogError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    ConnectOptions, Sqlite, Transaction,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Database manager - handles connection pooling and operations
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl Database {
    /// Create new database connection with migrations
    ///
    /// # Arguments
    /// * `database_path` - Path to SQLite database file (will be created if doesn't exist)
    ///
    /// # Errors
    /// Returns error if:
    /// - Parent directory doesn't exist and can't be created
    /// - Database file can't be opened
    /// - Migrations fail
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        Self::open(database_path.as_ref(), DEFAULT_MAX_CONNECTIONS, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Create database from loaded configuration
    pub async fn from_config(settings: &DatabaseSettings) -> Result<Self> {
        Self::open(
            &settings.path,
            settings.max_connections,
            Duration::from_secs(settings.busy_timeout_secs),
        )
        .await
    }

    async fn open(path: &Path, max_connections: u32, busy_timeout: Duration) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CatalogError::FileIoError(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(busy_timeout)
            .connect_with(connect_opts)
            .await?;

        let db = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db.migrate().await?;

        info!(path = %path.display(), max_connections, "Opened podcast database");
        Ok(db)
    }

    /// Create in-memory database for testing
    ///
    /// # Errors
    /// Returns error if database creation or migration fails
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .disable_statement_logging();

        // Every connection to ":memory:" is a separate database, so keep
        // exactly one and never let it expire.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;

        let db = Self { pool, path: None };
        db.migrate().await?;

        debug!("Opened in-memory podcast database");
        Ok(db)
    }

    /// Run database migrations
    ///
    /// Applies all pending migrations to bring the database schema up to date.
    /// Migrations are run automatically when creating a new database connection.
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| CatalogError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    /// Get reference to the connection pool
    ///
    /// Use this to execute queries directly on the pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction; dropped without `commit` it rolls back
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Get database file path
    ///
    /// Returns `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    ///
    /// This will wait for all active connections to finish before closing.
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Check database integrity
    ///
    /// Runs SQLite integrity check and returns true if database is okay.
    pub async fn check_integrity(&self) -> Result<bool> {
        let result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == "ok")
    }
}
