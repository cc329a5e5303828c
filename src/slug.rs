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


//! URL slugs
//!
//! Every slug stored in the catalog passes through [`slugify`]:
//! - lower-cased
//! - each run of characters outside `[a-z0-9]` becomes a single `-`
//! - no leading or trailing `-`
//! - at most [`MAX_SLUG_LEN`] characters
//!
//! Normalizing an already-normalized slug returns it unchanged. Empty output is
//! allowed; whether an empty or duplicate slug is acceptable is decided by the
//! storage layer when the row is written.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column width of `podcasts.slug` and `media.slug`
pub const MAX_SLUG_LEN: usize = 50;

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new(r"[^a-z0-9]+").expect("static regex");
}

/// Normalize arbitrary text into a URL-safe slug
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let collapsed = SEPARATOR_RUN.replace_all(&lowered, "-");
    let trimmed = collapsed.trim_matches('-');

    // Output is pure ASCII here, so byte length == char length.
    let truncated = if trimmed.len() > MAX_SLUG_LEN {
        &trimmed[..MAX_SLUG_LEN]
    } else {
        trimmed
    };

    truncated.trim_end_matches('-').to_string()
}

/// A string that is guaranteed to be in slug form
///
/// The only way to build one is through [`Slug::new`], which runs
/// [`slugify`] on the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(input: &str) -> Self {
        Slug(slugify(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Slug {
    fn from(value: String) -> Self {
        Slug::new(&value)
    }
}

impl From<&str> for Slug {
    fn from(value: &str) -> Self {
        Slug::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalization() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  The   Daily  Show  "), "the-daily-show");
        assert_eq!(slugify("arts_and--design"), "arts-and-design");
    }

    #[test]
    fn test_already_valid_slug_is_unchanged() {
        assert_eq!(slugify("my-podcast-2024"), "my-podcast-2024");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_non_ascii_becomes_separator() {
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_separator() {
        // 49 letters, a space, then more text: the cut lands right after the separator
        let input = format!("{} tail", "a".repeat(49));
        let slug = slugify(&input);
        assert_eq!(slug, "a".repeat(49));
        assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn test_long_input_is_capped() {
        let slug = slugify(&"word ".repeat(40));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slug_newtype_normalizes_on_construction() {
        let slug = Slug::new("Arts & Design");
        assert_eq!(slug.as_str(), "arts-design");
        assert_eq!(Slug::from(slug.to_string()), slug);
    }

    #[test]
    fn test_slug_deserialization_normalizes() {
        let slug: Slug = serde_json::from_str("\"Mixed CASE slug\"").unwrap();
        assert_eq!(slug.as_str(), "mixed-case-slug");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"mixed-case-slug\"");
    }
}
