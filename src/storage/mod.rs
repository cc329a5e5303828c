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


//! Database storage and models
//!
//! This module handles all database operations using SQLite via sqlx.
//!
//! # Database Schema
//! - podcasts: show metadata, unique slug, author composite, explicit flag
//! - media: episodes and standalone media, status bitmask, optional `podcast_id`
//!
//! # Usage Example
//! ```no_run
//! use podcast_catalog::storage::{Database, queries, Author, NewPodcast};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./catalog.db").await?;
//!
//! let new_podcast = NewPodcast::new(
//!     "Design Matters",
//!     Author::new("Debbie", "debbie@example.com"),
//!     "Design Matters!",
//! );
//! let podcast = queries::insert_podcast(db.pool(), &new_podcast).await?;
//! assert_eq!(podcast.slug().as_str(), "design-matters");
//!
//! let published = podcast.published_media_count(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod media_query;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use media_query::{MediaOrder, MediaQuery};
pub use models::{
    Author, Explicit, Media, MediaStatus, NewMedia, NewPodcast, Podcast, StatusPredicate,
};
