//! # Loader
//!
//! Serves parsed tables from the cache or the remote source according to a
//! [`LoadMode`]. Every call runs to completion on the calling thread; there is
//! no background refresh and no coalescing of concurrent requests.
pub mod mode;
pub(crate) mod source;

pub use mode::{LoadMode, LoadModeError};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::feed::table::ParsedTable;
use crate::feed::FeedParser;
use crate::loader::mode::ModePolicy;
use crate::loader::source::Source;
use crate::sheet::{SheetResolver, SheetSelector};
use crate::transport::{is_remote_url, HttpTransport, Transport};
use std::sync::Arc;

/// Entry point of the library: loads spreadsheet feeds as typed tables.
pub struct Loader {
    config: Config,
    cache: CacheStore,
    transport: Arc<dyn Transport>,
    parser: FeedParser,
}

impl Loader {
    /// Creates a loader fetching over HTTP.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Creates a loader with a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let cache = CacheStore::new(config.cache_dir.to_owned(), config.ttl());
        let parser = FeedParser::new(config.nullfill);
        Loader {
            config,
            cache,
            transport,
            parser,
        }
    }

    /// Replaces the cache store.
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Loads the table for `id` in the given mode, honoring the configured
    /// `cache` option for `load`.
    ///
    /// `id` is a full feed URL, a `container/sheet` id, or a bare container key
    /// whose worksheet is picked by `sheet`. Returns `None` when no data is
    /// available; the reason is logged.
    pub fn get(&self, id: &str, sheet: &SheetSelector, mode: LoadMode) -> Option<ParsedTable> {
        self.get_with_cache(id, sheet, mode, self.config.cache)
    }

    /// Like [`Loader::get`], with an explicit `cache` option for `load`.
    pub fn get_with_cache(&self, id: &str, sheet: &SheetSelector, mode: LoadMode, use_cache: bool) -> Option<ParsedTable> {
        let policy = mode.policy(use_cache);
        let id = self.resolve_id(id, sheet, policy)?;
        let url = if is_remote_url(&id) {
            id.to_owned()
        } else {
            self.config.feed_url(&id)
        };
        tracing::debug!(id = %id, %mode, "loading");
        self.source()
            .acquire(policy, &id, &url, |body| self.parser.parse(body))
    }

    /// Turns a bare container key into a `container/sheet` id.
    fn resolve_id(&self, id: &str, sheet: &SheetSelector, policy: ModePolicy) -> Option<String> {
        if is_remote_url(id) || id.contains('/') {
            return Some(id.to_owned());
        }
        let sheet_id = SheetResolver::new(self.source(), &self.config).resolve_sheet_id(id, sheet, policy)?;
        Some(format!("{id}/{sheet_id}"))
    }

    fn source(&self) -> Source<'_> {
        Source {
            cache: &self.cache,
            transport: self.transport.as_ref(),
            timeout: self.config.timeout(),
        }
    }
}
