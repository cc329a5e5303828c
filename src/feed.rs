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


//! Feed-facing helpers
//!
//! Small pieces of policy that sit between stored podcast metadata and
//! whatever serves the RSS feed: reading the iTunes category string and
//! deciding whether a feed request should be handed off to FeedBurner.

use crate::storage::models::Podcast;
use serde::Serialize;
use std::fmt;
use tracing::warn;
use url::Url;

const CATEGORY_SEPARATOR: char = '>';

/// iTunes category, optionally with one subcategory
///
/// Stored as a single string such as `"Arts > Design"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPath {
    pub top: String,
    pub sub: Option<String>,
}

impl CategoryPath {
    /// Parse `"Top"` or `"Top > Sub"`; returns `None` when there is no top level
    ///
    /// Anything after a second separator is folded into the subcategory.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.splitn(2, CATEGORY_SEPARATOR);
        let top = parts.next().map(str::trim).filter(|s| !s.is_empty())?;
        let sub = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            top: top.to_string(),
            sub,
        })
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{} {} {}", self.top, CATEGORY_SEPARATOR, sub),
            None => f.write_str(&self.top),
        }
    }
}

/// Where a feed request for `podcast` should be redirected, if anywhere
///
/// FeedBurner polls the original feed to build its copy, so its own requests
/// must never be redirected back to it.
pub fn redirect_target(podcast: &Podcast, user_agent: Option<&str>) -> Option<Url> {
    let target = podcast.feedburner_url.as_deref()?.trim();
    if target.is_empty() || is_feedburner(user_agent) {
        return None;
    }

    match Url::parse(target) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(podcast = %podcast.slug(), url = target, error = %e, "Ignoring unparseable FeedBurner URL");
            None
        }
    }
}

fn is_feedburner(user_agent: Option<&str>) -> bool {
    user_agent
        .map(|ua| ua.to_ascii_lowercase().contains("feedburner"))
        .unwrap_or(false)
}
