//! Library configuration: an immutable value handed to [`crate::loader::Loader`].
use crate::error::{ResultMessage, SheetFeedError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for loading and caching spreadsheet feeds.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// cache_dir = "/var/cache/sheets"
/// expires = 600
/// jsonp = true
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory to save cache files
    pub cache_dir: PathBuf,
    /// Whether `load` reads the cache before fetching
    pub cache: bool,
    /// Prefix of the cell feed URL
    pub feed_prefix: String,
    /// Suffix of the cell feed URL
    pub feed_suffix: String,
    /// Prefix of the worksheet list URL
    pub worksheets_prefix: String,
    /// Suffix of the worksheet list URL
    pub worksheets_suffix: String,
    /// Remote request timeout in seconds
    pub timeout: u64,
    /// Cache lifetime in seconds
    pub expires: u64,
    /// Allow callback-wrapped responses
    pub jsonp: bool,
    /// Pad rows with nulls for every header column
    pub nullfill: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_dir: PathBuf::from("./cache"),
            cache: true,
            feed_prefix: "https://spreadsheets.google.com/feeds/cells/".to_owned(),
            feed_suffix: "/public/basic?alt=json".to_owned(),
            worksheets_prefix: "https://spreadsheets.google.com/feeds/worksheets/".to_owned(),
            worksheets_suffix: "/public/basic?alt=json".to_owned(),
            timeout: 30,
            expires: 3600,
            jsonp: false,
            nullfill: true,
        }
    }
}

impl Config {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, SheetFeedError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetFeedError> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map_err(SheetFeedError::from)
            .and_then(|source| Self::from_toml_str(&source))
            .with_prefix(&path.display().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires)
    }

    /// URL of the cell feed of a `container/sheet` id.
    pub fn feed_url(&self, id: &str) -> String {
        format!("{}{}{}", self.feed_prefix, id, self.feed_suffix)
    }

    /// URL of the worksheet list of a container.
    pub fn worksheets_url(&self, container: &str) -> String {
        format!("{}{}{}", self.worksheets_prefix, container, self.worksheets_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_document_overrides_keys() {
        let config = Config::from_toml_str("expires = 60\njsonp = true\ncache_dir = \"/tmp/sheets\"\n").unwrap();
        assert_eq!(config.ttl(), Duration::from_secs(60));
        assert!(config.jsonp);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/sheets"));
        assert_eq!(config.timeout, 30);
        assert!(config.nullfill);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("expire = 60\n"),
            Err(SheetFeedError::TomlError(_))
        ));
    }

    #[test]
    fn missing_file_names_path() {
        let error = Config::from_file("/nonexistent/sheet-feed.toml").unwrap_err();
        assert!(error.to_string().starts_with("/nonexistent/sheet-feed.toml: "));
    }

    #[test]
    fn read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "nullfill = false\n").unwrap();
        assert!(!Config::from_file(&path).unwrap().nullfill);
    }

    #[test]
    fn urls() {
        let config = Config::default();
        assert_eq!(
            config.feed_url("key/od6"),
            "https://spreadsheets.google.com/feeds/cells/key/od6/public/basic?alt=json"
        );
        assert_eq!(
            config.worksheets_url("key"),
            "https://spreadsheets.google.com/feeds/worksheets/key/public/basic?alt=json"
        );
    }
}
