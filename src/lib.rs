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


//! Podcast catalog storage
//!
//! Persistent podcast metadata for a media publishing system: shows with a
//! unique URL slug, an author, an explicit-content advisory and iTunes /
//! FeedBurner links, plus the media (episodes) attached to them.
//!
//! - [`storage`] - SQLite schema, models and queries
//! - [`slug`] - URL slug normalization
//! - [`feed`] - category parsing and feed redirect policy
//! - [`config`] / [`logger`] - ambient setup for binaries

pub mod config;
pub mod error;
pub mod feed;
pub mod logger;
pub mod slug;
pub mod storage;

pub use error::{CatalogError, Result};
pub use slug::{slugify, Slug};
