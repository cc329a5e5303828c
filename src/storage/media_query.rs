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


//! Episode query handle
//!
//! [`MediaQuery`] is what [`Podcast::media`](crate::storage::Podcast::media)
//! returns: a description of "this podcast's episodes" that can be narrowed,
//! ordered and paginated before anything touches the database.
//!
//! ```no_run
//! use podcast_catalog::storage::{Database, MediaOrder, queries};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new_in_memory().await?;
//! let podcast = queries::find_podcast_by_slug(db.pool(), "my-show").await?.unwrap();
//!
//! let latest = podcast
//!     .media()
//!     .published()
//!     .order_by(MediaOrder::NewestFirst)
//!     .page(1, 10)
//!     .fetch_all(db.pool())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! `count`, `exists` and `contains` are answered by SQL aggregates, so checking
//! a large episode list never loads it.

use crate::error::Result;
use crate::storage::models::{Media, MediaStatus, StatusPredicate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Sort order for episode listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaOrder {
    /// Insertion order
    #[default]
    Id,
    NewestFirst,
    OldestFirst,
    Title,
    /// Scheduled publish date, newest first; unscheduled media last
    PublishOnDesc,
}

impl MediaOrder {
    fn sql(self) -> &'static str {
        match self {
            MediaOrder::Id => "id ASC",
            MediaOrder::NewestFirst => "created_on DESC, id DESC",
            MediaOrder::OldestFirst => "created_on ASC, id ASC",
            MediaOrder::Title => "title ASC, id ASC",
            MediaOrder::PublishOnDesc => "publish_on IS NULL, publish_on DESC, id DESC",
        }
    }
}

/// Composable query over one podcast's media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    podcast_id: i64,
    predicate: StatusPredicate,
    order: MediaOrder,
    limit: Option<i64>,
    offset: i64,
}

impl MediaQuery {
    pub fn for_podcast(podcast_id: i64) -> Self {
        Self {
            podcast_id,
            predicate: StatusPredicate::any(),
            order: MediaOrder::default(),
            limit: None,
            offset: 0,
        }
    }

    pub fn podcast_id(&self) -> i64 {
        self.podcast_id
    }

    /// Require every bit in `status`
    pub fn with_status(mut self, status: MediaStatus) -> Self {
        self.predicate = self.predicate.and_including(status);
        self
    }

    /// Reject rows that have any bit in `status`
    pub fn without_status(mut self, status: MediaStatus) -> Self {
        self.predicate = self.predicate.and_excluding(status);
        self
    }

    /// Same rows as `published_media_count` counts
    pub fn published(self) -> Self {
        self.with_status(MediaStatus::PUBLISH).not_trashed()
    }

    /// Same rows as `media_count` counts
    pub fn not_trashed(self) -> Self {
        self.without_status(MediaStatus::TRASH)
    }

    pub fn order_by(mut self, order: MediaOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset.max(0);
        self
    }

    /// 1-based page of `per_page` rows
    pub fn page(self, page: i64, per_page: i64) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(0);
        self.limit(per_page).offset((page - 1).saturating_mul(per_page))
    }

    pub fn predicate(&self) -> StatusPredicate {
        self.predicate
    }

    fn push_filters<'a>(&self, builder: &mut QueryBuilder<'a, Sqlite>) {
        builder
            .push(" WHERE podcast_id = ")
            .push_bind(self.podcast_id);

        if !self.predicate.include.is_empty() {
            builder
                .push(" AND (status & ")
                .push_bind(self.predicate.include.bits())
                .push(") = ")
                .push_bind(self.predicate.include.bits());
        }

        if !self.predicate.exclude.is_empty() {
            builder
                .push(" AND (status & ")
                .push_bind(self.predicate.exclude.bits())
                .push(") = 0");
        }
    }

    fn push_window<'a>(&self, builder: &mut QueryBuilder<'a, Sqlite>) {
        builder.push(" ORDER BY ").push(self.order.sql());

        // SQLite needs a LIMIT clause before OFFSET; -1 means unbounded.
        match (self.limit, self.offset) {
            (None, 0) => {}
            (limit, offset) => {
                builder
                    .push(" LIMIT ")
                    .push_bind(limit.unwrap_or(-1))
                    .push(" OFFSET ")
                    .push_bind(offset);
            }
        }
    }

    /// Run the query and load the matching rows
    pub async fn fetch_all(&self, pool: &SqlitePool) -> Result<Vec<Media>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, podcast_id, slug, title, status, created_on, modified_on, publish_on FROM media",
        );
        self.push_filters(&mut builder);
        self.push_window(&mut builder);

        let media = builder
            .build_query_as::<Media>()
            .fetch_all(pool)
            .await?;

        tracing::debug!(podcast_id = self.podcast_id, rows = media.len(), "Fetched media");
        Ok(media)
    }

    /// First row of the window, if any
    pub async fn fetch_first(&self, pool: &SqlitePool) -> Result<Option<Media>> {
        let media = self.clone().limit(1).fetch_all(pool).await?;
        Ok(media.into_iter().next())
    }

    /// Number of matching rows (ordering and pagination are ignored)
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(id) FROM media");
        self.push_filters(&mut builder);

        let count: i64 = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    /// True if at least one row matches
    pub async fn exists(&self, pool: &SqlitePool) -> Result<bool> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT EXISTS (SELECT 1 FROM media");
        self.push_filters(&mut builder);
        builder.push(")");

        let exists: bool = builder.build_query_scalar::<bool>().fetch_one(pool).await?;
        Ok(exists)
    }

    /// True if `media_id` belongs to this podcast and passes the status filter
    pub async fn contains(&self, pool: &SqlitePool, media_id: i64) -> Result<bool> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT EXISTS (SELECT 1 FROM media");
        self.push_filters(&mut builder);
        builder.push(" AND id = ").push_bind(media_id).push(")");

        let contains: bool = builder.build_query_scalar::<bool>().fetch_one(pool).await?;
        Ok(contains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_matches_counter_predicate() {
        let query = MediaQuery::for_podcast(3).published();
        assert_eq!(query.predicate(), StatusPredicate::published());
        assert_eq!(MediaQuery::for_podcast(3).not_trashed().predicate(), StatusPredicate::not_trashed());
    }

    #[test]
    fn test_page_math() {
        let query = MediaQuery::for_podcast(1).page(3, 20);
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.offset, 40);

        let clamped = MediaQuery::for_podcast(1).page(0, 10);
        assert_eq!(clamped.offset, 0);
    }

    #[test]
    fn test_page_math_saturates() {
        let query = MediaQuery::for_podcast(1).page(i64::MAX, 100);
        assert_eq!(query.limit, Some(100));
        assert_eq!(query.offset, i64::MAX);

        let huge = MediaQuery::for_podcast(1).page(i64::MAX, i64::MAX);
        assert_eq!(huge.offset, i64::MAX);
    }

    #[test]
    fn test_filter_sql() {
        let query = MediaQuery::for_podcast(9).published();
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(id) FROM media");
        query.push_filters(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(id) FROM media WHERE podcast_id = ? AND (status & ?) = ? AND (status & ?) = 0"
        );
    }

    #[test]
    fn test_window_sql_without_limit_uses_unbounded_limit() {
        let query = MediaQuery::for_podcast(9).offset(5);
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM media");
        query.push_window(&mut builder);
        assert_eq!(builder.sql(), "SELECT * FROM media ORDER BY id ASC LIMIT ? OFFSET ?");
    }
}
