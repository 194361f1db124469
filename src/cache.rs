//! # Snapshot Cache
//!
//! File-backed cache of parsed tables and worksheet lists. Each resource id is
//! stored in one file named after a hash of the id; the file's modification
//! time is the write time used for expiry.
//!
//! Writers race freely: two requests that both miss will both fetch and both
//! write, and the last rename wins. Every write is a full snapshot of the same
//! resource, and the rename is atomic, so readers never see partial data.
use crate::error::{ResultMessage, SheetFeedError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors related to cache storage.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cannot persist cache entry '{path}': {source}")]
    PersistError { path: String, source: std::io::Error },
}

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Derives the storage key of a resource id: hex SHA-256 of the URL-encoded id.
pub fn cache_key(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    hex::encode(Sha256::digest(encoded.as_bytes()))
}

/// Time-bounded snapshot store rooted at a directory.
#[derive(Clone)]
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        CacheStore {
            dir: dir.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Path of the file holding the entry for `id`.
    pub fn path(&self, id: &str) -> PathBuf {
        self.dir.join(cache_key(id))
    }

    /// Reads the entry for `id` if it exists and has not expired.
    /// With `force`, expiry is ignored.
    pub fn read<T: DeserializeOwned>(&self, id: &str, force: bool) -> Result<Option<T>, SheetFeedError> {
        let path = self.path(id);
        let modified = match fs::metadata(&path).and_then(|metadata| metadata.modified()) {
            Ok(modified) => modified,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(SheetFeedError::from(error)).with_prefix(&path.display().to_string()),
        };
        if !force && self.is_expired(modified) {
            tracing::debug!(id, "cache entry expired");
            return Ok(None);
        }
        let content = fs::read(&path)
            .map_err(SheetFeedError::from)
            .with_prefix(&path.display().to_string())?;
        let value = serde_json::from_slice(&content)
            .map_err(SheetFeedError::from)
            .with_prefix(&path.display().to_string())?;
        Ok(Some(value))
    }

    /// Reads the entry for `id` regardless of its age.
    pub fn read_force<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, SheetFeedError> {
        self.read(id, true)
    }

    /// Persists `value` as the entry for `id`, replacing any previous entry atomically.
    pub fn write<T: Serialize>(&self, id: &str, value: &T) -> Result<(), SheetFeedError> {
        fs::create_dir_all(&self.dir)
            .map_err(SheetFeedError::from)
            .with_prefix(&self.dir.display().to_string())?;
        let content = serde_json::to_vec(value)?;
        let path = self.path(id);
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(&content)?;
        file.flush()?;
        file.persist(&path).map_err(|error| CacheError::PersistError {
            path: path.display().to_string(),
            source: error.error,
        })?;
        Ok(())
    }

    /// Removes the entry for `id`. Returns whether an entry existed.
    pub fn remove(&self, id: &str) -> Result<bool, SheetFeedError> {
        match fs::remove_file(self.path(id)) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Removes every regular, non-hidden file in the cache directory.
    /// Returns the number of removed files.
    pub fn clear(&self) -> Result<usize, SheetFeedError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(0),
            Err(error) => return Err(SheetFeedError::from(error)).with_prefix(&self.dir.display().to_string()),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with('.'))
                .unwrap_or(true);
            if !hidden && path.is_file() {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// An entry is expired once strictly more than the TTL has elapsed since its write.
    /// A write time in the future counts as fresh.
    fn is_expired(&self, modified: SystemTime) -> bool {
        let elapsed = self
            .clock
            .now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        elapsed > self.ttl
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock pinned to a settable instant.
    pub(crate) struct FixedClock(pub(crate) Mutex<SystemTime>);

    impl FixedClock {
        pub(crate) fn new(now: SystemTime) -> Arc<Self> {
            Arc::new(FixedClock(Mutex::new(now)))
        }

        pub(crate) fn set(&self, now: SystemTime) {
            *self.0.lock().unwrap() = now;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> SystemTime {
            *self.0.lock().unwrap()
        }
    }

    fn written_at(store: &CacheStore, id: &str) -> SystemTime {
        fs::metadata(store.path(id)).unwrap().modified().unwrap()
    }

    #[test]
    fn key_is_stable_and_path_safe() {
        let key = cache_key("key/od6");
        assert_eq!(key, cache_key("key/od6"));
        assert_ne!(key, cache_key("key/od7"));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|char| char.is_ascii_hexdigit()));
    }

    #[test]
    fn read_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60));
        assert_eq!(store.read::<Vec<u32>>("nothing", false).unwrap(), None);
        assert_eq!(store.read_force::<Vec<u32>>("nothing").unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested"), Duration::from_secs(60));
        store.write("key/od6", &vec![1, 2, 3]).unwrap();
        assert_eq!(store.read::<Vec<u32>>("key/od6", false).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn ttl_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let ttl = Duration::from_secs(3600);
        let clock = FixedClock::new(SystemTime::now());
        let store = CacheStore::new(dir.path(), ttl).with_clock(clock.clone());
        store.write("id", &"snapshot").unwrap();
        let written = written_at(&store, "id");

        clock.set(written + ttl - Duration::from_secs(1));
        assert_eq!(store.read::<String>("id", false).unwrap().as_deref(), Some("snapshot"));

        clock.set(written + ttl);
        assert_eq!(store.read::<String>("id", false).unwrap().as_deref(), Some("snapshot"));

        clock.set(written + ttl + Duration::from_secs(1));
        assert_eq!(store.read::<String>("id", false).unwrap(), None);
        assert_eq!(store.read_force::<String>("id").unwrap().as_deref(), Some("snapshot"));
    }

    #[test]
    fn future_write_time_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock::new(SystemTime::UNIX_EPOCH);
        let store = CacheStore::new(dir.path(), Duration::from_secs(1)).with_clock(clock);
        store.write("id", &1).unwrap();
        assert_eq!(store.read::<u32>("id", false).unwrap(), Some(1));
    }

    #[test]
    fn rewrite_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60));
        store.write("id", &"old").unwrap();
        store.write("id", &"new").unwrap();
        assert_eq!(store.read::<String>("id", false).unwrap().as_deref(), Some("new"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60));
        fs::write(store.path("id"), b"{truncated").unwrap();
        assert!(store.read::<Vec<u32>>("id", false).is_err());
    }

    #[test]
    fn remove_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60));
        store.write("id", &1).unwrap();
        assert!(store.remove("id").unwrap());
        assert!(!store.remove("id").unwrap());
        assert_eq!(store.read_force::<u32>("id").unwrap(), None);
    }

    #[test]
    fn clear_keeps_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path(), Duration::from_secs(60));
        store.write("a", &1).unwrap();
        store.write("b", &2).unwrap();
        fs::write(dir.path().join(".keep"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(dir.path().join(".keep").exists());
        assert!(dir.path().join("sub").exists());
        assert_eq!(store.read_force::<u32>("a").unwrap(), None);
    }

    #[test]
    fn clear_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("absent"), Duration::from_secs(60));
        assert_eq!(store.clear().unwrap(), 0);
    }
}
