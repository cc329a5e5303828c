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


//! Database query functions
//!
//! Repository-style functions per entity type. Every function takes the pool
//! explicitly; there is no global session.
//!
//! # Timestamps
//! `created_on` and `modified_on` are written here and nowhere else. Updates
//! never move `modified_on` backwards, even if the wall clock does.
//!
//! # Constraint failures
//! Duplicate slugs, NULLs in required columns and oversized strings are
//! rejected by the schema and returned unchanged as
//! [`CatalogError::SqlxError`].

use crate::error::{CatalogError, Result};
use crate::storage::models::*;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const PODCAST_COLUMNS: &str = "id, slug, created_on, modified_on, title, subtitle, description, \
     category, author_name, author_email, explicit, copyright, itunes_url, feedburner_url";

const MEDIA_COLUMNS: &str = "id, podcast_id, slug, title, status, created_on, modified_on, publish_on";

// ============================================================================
// PODCAST QUERIES
// ============================================================================

/// Insert a new podcast and return it as stored
pub async fn insert_podcast(pool: &SqlitePool, podcast: &NewPodcast) -> Result<Podcast> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO podcasts (
            slug, created_on, modified_on, title, subtitle, description, category,
            author_name, author_email, explicit, copyright, itunes_url, feedburner_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(podcast.slug.as_str())
    .bind(now)
    .bind(now)
    .bind(&podcast.title)
    .bind(&podcast.subtitle)
    .bind(&podcast.description)
    .bind(&podcast.category)
    .bind(podcast.author.name())
    .bind(podcast.author.email())
    .bind(podcast.explicit.to_column())
    .bind(&podcast.copyright)
    .bind(&podcast.itunes_url)
    .bind(&podcast.feedburner_url)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!(podcast_id = id, slug = %podcast.slug, "Inserted podcast");

    find_podcast_by_id(pool, id)
        .await?
        .ok_or_else(|| CatalogError::InvalidState(format!("Podcast {} vanished after insert", id)))
}

/// Find podcast by ID
pub async fn find_podcast_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Podcast>> {
    let sql = format!("SELECT {} FROM podcasts WHERE id = ?", PODCAST_COLUMNS);
    let podcast = sqlx::query_as::<_, Podcast>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(podcast)
}

/// Find podcast by slug
///
/// The lookup value is normalized first, so `"My Show"` finds `my-show`.
pub async fn find_podcast_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Podcast>> {
    let slug = crate::slug::slugify(slug);
    let sql = format!("SELECT {} FROM podcasts WHERE slug = ?", PODCAST_COLUMNS);
    let podcast = sqlx::query_as::<_, Podcast>(&sql)
        .bind(&slug)
        .fetch_optional(pool)
        .await?;

    Ok(podcast)
}

/// List podcasts ordered by title, counters deferred
pub async fn list_podcasts(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Podcast>> {
    let sql = format!(
        "SELECT {} FROM podcasts ORDER BY title, id LIMIT ? OFFSET ?",
        PODCAST_COLUMNS
    );
    let podcasts = sqlx::query_as::<_, Podcast>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(podcasts)
}

/// List podcasts ordered by title with both episode counters loaded up front
///
/// Each counter is a correlated subquery in the same SELECT, so a listing page
/// costs one round trip instead of `1 + 2n`.
pub async fn list_podcasts_with_counts(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Podcast>> {
    let all = StatusPredicate::not_trashed();
    let published = StatusPredicate::published();

    let sql = format!(
        r#"
        SELECT {columns},
            (SELECT COUNT(m.id) FROM media m
              WHERE m.podcast_id = podcasts.id
                AND (m.status & ?) = ? AND (m.status & ?) = 0) AS media_count,
            (SELECT COUNT(m.id) FROM media m
              WHERE m.podcast_id = podcasts.id
                AND (m.status & ?) = ? AND (m.status & ?) = 0) AS published_media_count
        FROM podcasts
        ORDER BY title, id
        LIMIT ? OFFSET ?
        "#,
        columns = PODCAST_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(all.include.bits())
        .bind(all.include.bits())
        .bind(all.exclude.bits())
        .bind(published.include.bits())
        .bind(published.include.bits())
        .bind(published.exclude.bits())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let mut podcasts = Vec::with_capacity(rows.len());
    for row in rows {
        let media_count: i64 = row.try_get("media_count")?;
        let published_media_count: i64 = row.try_get("published_media_count")?;
        let podcast: Podcast = sqlx::FromRow::from_row(&row)?;
        podcasts.push(podcast.with_counts(media_count, published_media_count));
    }

    Ok(podcasts)
}

/// Persist the current attribute values of a loaded podcast
///
/// Refreshes `modified_on` (both in the row and on `podcast`). The new value is
/// `max(now, previous modified_on)` so it never decreases; `created_on` is left
/// untouched.
///
/// The comparison and the write are one statement, so concurrent updates
/// queue on the write lock instead of failing on a stale read snapshot. Every
/// stored timestamp is RFC 3339 UTC text written by this module, so comparing
/// them as strings orders them by time.
pub async fn update_podcast(pool: &SqlitePool, podcast: &mut Podcast) -> Result<()> {
    let now = Utc::now();

    let modified_on: Option<DateTime<Utc>> = sqlx::query_scalar(
        r#"
        UPDATE podcasts SET
            slug = ?,
            modified_on = CASE WHEN ? > modified_on THEN ? ELSE modified_on END,
            title = ?, subtitle = ?, description = ?,
            category = ?, author_name = ?, author_email = ?, explicit = ?,
            copyright = ?, itunes_url = ?, feedburner_url = ?
        WHERE id = ?
        RETURNING modified_on
        "#,
    )
    .bind(podcast.slug().as_str())
    .bind(now)
    .bind(now)
    .bind(&podcast.title)
    .bind(&podcast.subtitle)
    .bind(&podcast.description)
    .bind(&podcast.category)
    .bind(podcast.author.name())
    .bind(podcast.author.email())
    .bind(podcast.explicit.to_column())
    .bind(&podcast.copyright)
    .bind(&podcast.itunes_url)
    .bind(&podcast.feedburner_url)
    .bind(podcast.id())
    .fetch_optional(pool)
    .await?;

    let modified_on = modified_on
        .ok_or_else(|| CatalogError::not_found(format!("podcast {}", podcast.id())))?;

    podcast.set_modified_on(modified_on);
    debug!(podcast_id = podcast.id(), %modified_on, "Updated podcast");

    Ok(())
}

/// Delete podcast by ID
///
/// Episodes are kept; their `podcast_id` is cleared by the foreign key.
pub async fn delete_podcast(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM podcasts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!("podcast {}", id)));
    }

    info!(podcast_id = id, "Deleted podcast");
    Ok(())
}

/// Count total podcasts
pub async fn count_podcasts(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM podcasts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// ============================================================================
// EPISODE COUNTERS
// ============================================================================

/// Count a podcast's media whose status satisfies `predicate`
///
/// This is the query behind `media_count` (`StatusPredicate::not_trashed()`)
/// and `published_media_count` (`StatusPredicate::published()`).
pub async fn count_media(
    pool: &SqlitePool,
    podcast_id: i64,
    predicate: StatusPredicate,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(id) FROM media
        WHERE podcast_id = ?
          AND (status & ?) = ?
          AND (status & ?) = 0
        "#,
    )
    .bind(podcast_id)
    .bind(predicate.include.bits())
    .bind(predicate.include.bits())
    .bind(predicate.exclude.bits())
    .fetch_one(pool)
    .await?;

    debug!(
        podcast_id,
        include = predicate.include.bits(),
        exclude = predicate.exclude.bits(),
        count,
        "Counted media"
    );
    Ok(count)
}

// ============================================================================
// MEDIA QUERIES
// ============================================================================

/// Insert a new media item and return it as stored
pub async fn insert_media(pool: &SqlitePool, media: &NewMedia) -> Result<Media> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO media (podcast_id, slug, title, status, created_on, modified_on, publish_on)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(media.podcast_id)
    .bind(media.slug.as_str())
    .bind(&media.title)
    .bind(media.status.bits())
    .bind(now)
    .bind(now)
    .bind(media.publish_on)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!(media_id = id, podcast_id = ?media.podcast_id, slug = %media.slug, "Inserted media");

    find_media_by_id(pool, id)
        .await?
        .ok_or_else(|| CatalogError::InvalidState(format!("Media {} vanished after insert", id)))
}

/// Find media by ID
pub async fn find_media_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Media>> {
    let sql = format!("SELECT {} FROM media WHERE id = ?", MEDIA_COLUMNS);
    let media = sqlx::query_as::<_, Media>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(media)
}

/// Replace the status bitmask of a media item
pub async fn update_media_status(pool: &SqlitePool, id: i64, status: MediaStatus) -> Result<()> {
    let result = sqlx::query("UPDATE media SET status = ?, modified_on = ? WHERE id = ?")
        .bind(status.bits())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!("media {}", id)));
    }

    debug!(media_id = id, %status, "Updated media status");
    Ok(())
}

/// Attach media to a podcast, or detach it with `None`
///
/// The podcast's episode list and the media's back-reference are the same
/// column, so both directions change together.
pub async fn set_media_podcast(
    pool: &SqlitePool,
    media_id: i64,
    podcast_id: Option<i64>,
) -> Result<()> {
    let result = sqlx::query("UPDATE media SET podcast_id = ?, modified_on = ? WHERE id = ?")
        .bind(podcast_id)
        .bind(Utc::now())
        .bind(media_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!("media {}", media_id)));
    }

    debug!(media_id, ?podcast_id, "Moved media");
    Ok(())
}

/// Follow a media item's back-reference to its podcast
pub async fn find_media_podcast(pool: &SqlitePool, media: &Media) -> Result<Option<Podcast>> {
    match media.podcast_id() {
        Some(podcast_id) => find_podcast_by_id(pool, podcast_id).await,
        None => Ok(None),
    }
}

/// Delete media by ID
pub async fn delete_media(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM media WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(format!("media {}", id)));
    }

    info!(media_id = id, "Deleted media");
    Ok(())
}
