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


//! Logging setup
//!
//! The library only emits `tracing` events; binaries call [`init`] once.
//! `RUST_LOG` wins over the configured filter. Output goes to stderr so
//! stdout stays free for command results.

use crate::error::{CatalogError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// Fails if a subscriber is already installed or `filter` is not a valid
/// `EnvFilter` directive.
pub fn init(filter: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter).map_err(|e| {
            CatalogError::ConfigurationError(format!("invalid log filter '{}': {}", filter, e))
        })?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| CatalogError::ConfigurationError(format!("logger already set: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init("podcast_catalog=debug");
        assert!(init("podcast_catalog=debug").is_err());
    }
}
