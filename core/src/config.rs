//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::catalog::CatalogData;
use crate::error::Result;
use crate::seed::seed_data;

/// Storefront configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// JSON dataset to load; the bundled seed is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive)
    pub log_level: String,
    /// Units added per "add to cart" action
    pub default_add_quantity: i64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            log_level: "info".to_string(),
            default_add_quantity: 1,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_path: env::var("MARQUEE_CATALOG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            default_add_quantity: env::var("MARQUEE_DEFAULT_ADD_QUANTITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|quantity: &i64| *quantity >= 1)
                .unwrap_or(defaults.default_add_quantity),
        }
    }

    /// Loads the configured dataset, or the bundled seed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorefrontError::Load`] if the configured file cannot
    /// be read or parsed.
    pub fn load_catalog(&self) -> Result<CatalogData> {
        match &self.catalog_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading catalog from file");
                CatalogData::from_path(path)
            }
            None => {
                tracing::info!("Loading bundled seed catalog");
                Ok(seed_data())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorefrontError;

    #[test]
    fn test_default_loads_seed() {
        let config = StorefrontConfig::default();
        let data = config.load_catalog();
        assert_eq!(data.map(|d| d.concerts.len()), Ok(3));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let config = StorefrontConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/marquee/catalog.json")),
            ..StorefrontConfig::default()
        };
        assert!(matches!(config.load_catalog(), Err(StorefrontError::Load(_))));
    }
}
