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


//! Catalog configuration
//!
//! Sources, later ones win:
//! 1. built-in defaults
//! 2. optional TOML file
//! 3. `PODCAST_*` environment variables, `__` between nesting levels
//!    (e.g. `PODCAST_DATABASE__PATH=/srv/catalog.db`)

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from `path` (if given and present) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(CatalogError::ConfigurationError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("PODCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CatalogConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(CatalogError::ConfigurationError(
                "database.path must not be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(CatalogError::ConfigurationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("podcasts.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    30
}

fn default_log_filter() -> String {
    "podcast_catalog=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = CatalogConfig::default();
        assert_eq!(config.database.path, PathBuf::from("podcasts.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(
            file,
            "[database]\npath = \"/tmp/shows.db\"\nmax_connections = 2\n\n[log]\nfilter = \"debug\""
        )
        .unwrap();

        let config = CatalogConfig::load(Some(file.path())).expect("Failed to load config");
        assert_eq!(config.database.path, PathBuf::from("/tmp/shows.db"));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.busy_timeout_secs, 30);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CatalogConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = CatalogConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
