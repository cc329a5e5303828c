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


//! Database migrations
//!
//! This module handles database schema creation and migrations.
//!
//! # Migration Strategy
//! Migrations are plain runtime SQL, applied in order and recorded in the
//! `_migrations` table, so no build-time database connection is needed.
//!
//! # String limits
//! SQLite ignores declared column widths, so every bounded column also carries
//! a `CHECK (length(col) <= n)` constraint. Oversized values are rejected by
//! the storage layer at write time.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};
use tracing::info;

/// Run all database migrations
///
/// This function creates the database schema and applies any pending migrations.
/// Migrations are tracked in the `_migrations` table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Create migrations tracking table
    create_migrations_table(pool).await?;

    // Run all migrations in order
    run_migration(pool, 1, "podcasts", create_podcasts_table(pool)).await?;
    run_migration(pool, 2, "media", create_media_table(pool)).await?;

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    // Check if migration has been applied
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    info!(migration = name, "Applied migration");
    Ok(())
}

/// Podcast metadata table
async fn create_podcasts_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
CREATE TABLE IF NOT EXISTS podcasts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug VARCHAR(50) NOT NULL UNIQUE CHECK (length(slug) <= 50),

    -- Written by the storage layer only
    created_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,

    title TEXT NOT NULL CHECK (length(title) <= 50),
    subtitle TEXT CHECK (length(subtitle) <= 255),
    description TEXT,
    category TEXT CHECK (length(category) <= 50),  -- "Arts > Design"

    -- Author composite (not a foreign key)
    author_name TEXT NOT NULL CHECK (length(author_name) <= 50),
    author_email TEXT NOT NULL CHECK (length(author_email) <= 50),

    -- NULL = no advisory, 1 = yes, 0 = clean
    explicit BOOLEAN DEFAULT NULL,

    copyright TEXT CHECK (length(copyright) <= 50),
    itunes_url VARCHAR(80) CHECK (length(itunes_url) <= 80),
    feedburner_url VARCHAR(80) CHECK (length(feedburner_url) <= 80)
);
        "#,
    )
    .await?;

    Ok(())
}

/// Media table (podcast episodes and standalone media)
async fn create_media_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
CREATE TABLE IF NOT EXISTS media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    podcast_id INTEGER REFERENCES podcasts(id) ON DELETE SET NULL,
    slug VARCHAR(50) NOT NULL UNIQUE CHECK (length(slug) <= 50),
    title TEXT NOT NULL CHECK (length(title) <= 255),

    -- Bitmask: trash=1, publish=2, draft=4, unencoded=8, unreviewed=16
    status INTEGER NOT NULL DEFAULT 28,

    created_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    modified_on TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    publish_on TEXT
);

CREATE INDEX IF NOT EXISTS idx_media_podcast_status ON media(podcast_id, status);
        "#,
    )
    .await?;

    Ok(())
}
