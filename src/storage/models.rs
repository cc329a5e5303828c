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


//! Database models for the podcast catalog
//!
//! # SQLite Adaptations
//! - Media status stored as an integer bitmask (flag set, not an enum)
//! - Explicit advisory stored as a nullable boolean (three states)
//! - Author stored as two plain columns, exposed as one value
//! - DateTime stored as TEXT in ISO 8601 format
//!
//! Rows are decoded by hand (`FromRow` impls below) so that the composite and
//! tri-state values are rebuilt from their columns at read time.

use crate::error::{CatalogError, Result};
use crate::feed::CategoryPath;
use crate::slug::Slug;
use crate::storage::media_query::MediaQuery;
use crate::storage::queries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::str::FromStr;
use tokio::sync::OnceCell;

// ============================================================================
// ENUMS / FLAG SETS
// ============================================================================

/// Media status bitmask
///
/// Each bit is an independent flag; a media row may be e.g. published and
/// trashed at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaStatus(i64);

impl MediaStatus {
    pub const NONE: MediaStatus = MediaStatus(0);
    pub const TRASH: MediaStatus = MediaStatus(1);
    pub const PUBLISH: MediaStatus = MediaStatus(1 << 1);
    pub const DRAFT: MediaStatus = MediaStatus(1 << 2);
    pub const UNENCODED: MediaStatus = MediaStatus(1 << 3);
    pub const UNREVIEWED: MediaStatus = MediaStatus(1 << 4);

    const NAMED: [(&'static str, MediaStatus); 5] = [
        ("trash", MediaStatus::TRASH),
        ("publish", MediaStatus::PUBLISH),
        ("draft", MediaStatus::DRAFT),
        ("unencoded", MediaStatus::UNENCODED),
        ("unreviewed", MediaStatus::UNREVIEWED),
    ];

    /// Status given to freshly created media
    pub fn initial() -> Self {
        MediaStatus::DRAFT | MediaStatus::UNENCODED | MediaStatus::UNREVIEWED
    }

    pub fn from_bits(bits: i64) -> Self {
        MediaStatus(bits)
    }

    pub fn bits(self) -> i64 {
        self.0
    }

    /// True when every bit of `other` is set in `self`
    pub fn contains(self, other: MediaStatus) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when `self` and `other` share at least one bit
    pub fn intersects(self, other: MediaStatus) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: MediaStatus) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: MediaStatus) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags, in bit order
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for MediaStatus {
    type Output = MediaStatus;

    fn bitor(self, rhs: MediaStatus) -> MediaStatus {
        MediaStatus(self.0 | rhs.0)
    }
}

impl BitAnd for MediaStatus {
    type Output = MediaStatus;

    fn bitand(self, rhs: MediaStatus) -> MediaStatus {
        MediaStatus(self.0 & rhs.0)
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

/// Parses a comma-separated list of flag names, e.g. `"publish,draft"`
impl FromStr for MediaStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let mut status = MediaStatus::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let flag = Self::NAMED
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(part))
                .map(|(_, flag)| *flag)
                .ok_or_else(|| CatalogError::invalid_input(format!("Unknown media status '{}'", part)))?;
            status.insert(flag);
        }
        Ok(status)
    }
}

/// Bitmask test used by the episode counters and media filters
///
/// A status matches when it has every bit of `include` and none of `exclude`:
/// `(status & include) = include AND (status & exclude) = 0`.
/// Exclusion wins: a bit that is both required and forbidden matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusPredicate {
    pub include: MediaStatus,
    pub exclude: MediaStatus,
}

impl StatusPredicate {
    /// Matches every status
    pub fn any() -> Self {
        Self::default()
    }

    pub fn including(bits: MediaStatus) -> Self {
        Self { include: bits, exclude: MediaStatus::NONE }
    }

    pub fn excluding(bits: MediaStatus) -> Self {
        Self { include: MediaStatus::NONE, exclude: bits }
    }

    pub fn and_including(mut self, bits: MediaStatus) -> Self {
        self.include.insert(bits);
        self
    }

    pub fn and_excluding(mut self, bits: MediaStatus) -> Self {
        self.exclude.insert(bits);
        self
    }

    /// Everything that is not in the trash (`media_count`)
    pub fn not_trashed() -> Self {
        Self::excluding(MediaStatus::TRASH)
    }

    /// Published and not in the trash (`published_media_count`)
    pub fn published() -> Self {
        Self::including(MediaStatus::PUBLISH).and_excluding(MediaStatus::TRASH)
    }

    /// Evaluate the predicate in memory; mirrors the SQL rendering exactly
    pub fn matches(&self, status: MediaStatus) -> bool {
        status.contains(self.include) && !status.intersects(self.exclude)
    }
}

/// iTunes explicit advisory
///
/// Stored in a nullable boolean column:
///
/// | value | column |
/// |-------|--------|
/// | `Yes` | `true` |
/// | `No` (no advisory) | `NULL` |
/// | `Clean` | `false` |
///
/// `No` and `Clean` are different states and must never be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Explicit {
    Yes,
    #[default]
    No,
    Clean,
}

impl Explicit {
    pub fn from_column(value: Option<bool>) -> Self {
        match value {
            Some(true) => Explicit::Yes,
            None => Explicit::No,
            Some(false) => Explicit::Clean,
        }
    }

    pub fn to_column(self) -> Option<bool> {
        match self {
            Explicit::Yes => Some(true),
            Explicit::No => None,
            Explicit::Clean => Some(false),
        }
    }

    /// Value used by iTunes feed markup
    pub fn as_str(self) -> &'static str {
        match self {
            Explicit::Yes => "yes",
            Explicit::No => "no",
            Explicit::Clean => "clean",
        }
    }
}

impl FromStr for Explicit {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Explicit::Yes),
            "no" | "" => Ok(Explicit::No),
            "clean" => Ok(Explicit::Clean),
            other => Err(CatalogError::invalid_input(format!(
                "Explicit must be yes, no or clean (got '{}')",
                other
            ))),
        }
    }
}

// ============================================================================
// VALUE OBJECTS
// ============================================================================

/// Podcast author: two plain columns presented as one value
///
/// Not a relation to any account table. It has the same shape as one so a
/// later switch to a real foreign key does not change calling code. Fields are
/// read-only; replace the whole value to change it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Decompose into `(author_name, author_email)` column values
    pub fn into_parts(self) -> (String, String) {
        (self.name, self.email)
    }
}

// ============================================================================
// MAIN ENTITIES
// ============================================================================

/// Podcast metadata
///
/// `id`, `slug` and the timestamps are private: ids and timestamps are assigned
/// by the storage layer, and the slug is normalized on every assignment. The
/// descriptive fields are plain attributes; mutate them and hand the podcast to
/// [`queries::update_podcast`] to persist.
///
/// `media_count` and `published_media_count` are deferred: computed on first
/// access and then held for the lifetime of this instance.
#[derive(Debug, Clone, Serialize)]
pub struct Podcast {
    id: i64,
    slug: Slug,
    created_on: DateTime<Utc>,
    modified_on: DateTime<Utc>,

    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// iTunes category; `Arts > Design` names the Design subcategory of Arts
    pub category: Option<String>,
    pub author: Author,
    pub explicit: Explicit,
    pub copyright: Option<String>,
    /// Optional iTunes subscribe URL
    pub itunes_url: Option<String>,
    /// When set, feed requests are forwarded here (see [`crate::feed::redirect_target`])
    pub feedburner_url: Option<String>,

    #[serde(skip)]
    media_count: OnceCell<i64>,
    #[serde(skip)]
    published_media_count: OnceCell<i64>,
}

impl Podcast {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Assign a new slug; the input is normalized first
    pub fn set_slug(&mut self, slug: &str) {
        self.slug = Slug::new(slug);
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn modified_on(&self) -> DateTime<Utc> {
        self.modified_on
    }

    pub(crate) fn set_modified_on(&mut self, modified_on: DateTime<Utc>) {
        self.modified_on = modified_on;
    }

    /// Episodes of this podcast, as a query that has not run yet
    pub fn media(&self) -> MediaQuery {
        MediaQuery::for_podcast(self.id)
    }

    /// Number of episodes not in the trash
    pub async fn media_count(&self, pool: &SqlitePool) -> Result<i64> {
        self.media_count
            .get_or_try_init(|| queries::count_media(pool, self.id, StatusPredicate::not_trashed()))
            .await
            .copied()
    }

    /// Number of published episodes not in the trash
    pub async fn published_media_count(&self, pool: &SqlitePool) -> Result<i64> {
        self.published_media_count
            .get_or_try_init(|| queries::count_media(pool, self.id, StatusPredicate::published()))
            .await
            .copied()
    }

    /// Counter values already loaded for this instance, if any
    pub fn loaded_counts(&self) -> (Option<i64>, Option<i64>) {
        (
            self.media_count.get().copied(),
            self.published_media_count.get().copied(),
        )
    }

    /// Pre-fill the deferred counters (used by undeferred loads)
    pub(crate) fn with_counts(mut self, media_count: i64, published_media_count: i64) -> Self {
        self.media_count = OnceCell::from(media_count);
        self.published_media_count = OnceCell::from(published_media_count);
        self
    }

    /// Parsed form of [`Podcast::category`]
    pub fn category_path(&self) -> Option<CategoryPath> {
        self.category.as_deref().and_then(CategoryPath::parse)
    }
}

impl fmt::Display for Podcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Podcast: {}>", self.slug)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Podcast {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let slug: String = row.try_get("slug")?;
        let author_name: String = row.try_get("author_name")?;
        let author_email: String = row.try_get("author_email")?;
        let explicit: Option<bool> = row.try_get("explicit")?;

        Ok(Podcast {
            id: row.try_get("id")?,
            slug: Slug::new(&slug),
            created_on: row.try_get("created_on")?,
            modified_on: row.try_get("modified_on")?,
            title: row.try_get("title")?,
            subtitle: row.try_get("subtitle")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            author: Author::new(author_name, author_email),
            explicit: Explicit::from_column(explicit),
            copyright: row.try_get("copyright")?,
            itunes_url: row.try_get("itunes_url")?,
            feedburner_url: row.try_get("feedburner_url")?,
            media_count: OnceCell::new(),
            published_media_count: OnceCell::new(),
        })
    }
}

/// Media item (podcast episode)
///
/// `podcast_id` is the back-reference to the owning podcast; it is `None` for
/// standalone media.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    id: i64,
    podcast_id: Option<i64>,
    slug: Slug,
    created_on: DateTime<Utc>,
    modified_on: DateTime<Utc>,

    pub title: String,
    pub status: MediaStatus,
    pub publish_on: Option<DateTime<Utc>>,
}

impl Media {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn podcast_id(&self) -> Option<i64> {
        self.podcast_id
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.slug = Slug::new(slug);
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn modified_on(&self) -> DateTime<Utc> {
        self.modified_on
    }

    /// True when the media counts toward `published_media_count`
    pub fn is_published(&self) -> bool {
        StatusPredicate::published().matches(self.status)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Media {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let slug: String = row.try_get("slug")?;
        let status: i64 = row.try_get("status")?;

        Ok(Media {
            id: row.try_get("id")?,
            podcast_id: row.try_get("podcast_id")?,
            slug: Slug::new(&slug),
            created_on: row.try_get("created_on")?,
            modified_on: row.try_get("modified_on")?,
            title: row.try_get("title")?,
            status: MediaStatus::from_bits(status),
            publish_on: row.try_get("publish_on")?,
        })
    }
}

// ============================================================================
// INSERT MODELS (for creating new records)
// ============================================================================

/// New podcast record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPodcast {
    pub slug: Slug,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub author: Author,
    pub explicit: Explicit,
    pub copyright: Option<String>,
    pub itunes_url: Option<String>,
    pub feedburner_url: Option<String>,
}

impl NewPodcast {
    /// `slug_seed` is normalized into the slug; pass the title to derive one from it
    pub fn new(title: impl Into<String>, author: Author, slug_seed: &str) -> Self {
        Self {
            slug: Slug::new(slug_seed),
            title: title.into(),
            subtitle: None,
            description: None,
            category: None,
            author,
            explicit: Explicit::No,
            copyright: None,
            itunes_url: None,
            feedburner_url: None,
        }
    }
}

/// New media record for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedia {
    pub slug: Slug,
    pub title: String,
    pub podcast_id: Option<i64>,
    pub status: MediaStatus,
    pub publish_on: Option<DateTime<Utc>>,
}

impl NewMedia {
    pub fn new(title: impl Into<String>, slug_seed: &str) -> Self {
        Self {
            slug: Slug::new(slug_seed),
            title: title.into(),
            podcast_id: None,
            status: MediaStatus::initial(),
            publish_on: None,
        }
    }

    /// Attach to a podcast as an episode
    pub fn in_podcast(mut self, podcast_id: i64) -> Self {
        self.podcast_id = Some(podcast_id);
        self
    }

    pub fn with_status(mut self, status: MediaStatus) -> Self {
        self.status = status;
        self
    }
}
