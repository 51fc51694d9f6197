// Runtime configuration. Every setting has a default that matches the
// fixed behavior of a plain `library-catalog` run, so no variable needs to
// be set for normal use.

use std::path::PathBuf;

/// Google Books volume search endpoint.
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";
/// Catalog file, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "books.txt";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const API_URL_VAR: &str = "LIBRARY_API_URL";
pub const CATALOG_PATH_VAR: &str = "LIBRARY_CATALOG";
pub const LOG_FILTER_VAR: &str = "LIBRARY_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub catalog_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through `lookup`. Empty values are treated
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            api_url: get(API_URL_VAR, DEFAULT_API_URL),
            catalog_path: PathBuf::from(get(CATALOG_PATH_VAR, DEFAULT_CATALOG_PATH)),
            log_filter: get(LOG_FILTER_VAR, DEFAULT_LOG_FILTER),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.catalog_path, PathBuf::from("books.txt"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (API_URL_VAR, "http://127.0.0.1:9000/volumes"),
            (CATALOG_PATH_VAR, "/tmp/catalog.txt"),
            (LOG_FILTER_VAR, "library_catalog=debug"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_url, "http://127.0.0.1:9000/volumes");
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/catalog.txt"));
        assert_eq!(config.log_filter, "library_catalog=debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = Config::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, Config::default());
    }
}
