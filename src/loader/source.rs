use crate::cache::CacheStore;
use crate::error::SheetFeedError;
use crate::feed::ParseError;
use crate::loader::mode::{CacheRead, ModePolicy};
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Cache plus remote source, combined according to a [`ModePolicy`].
#[derive(Clone, Copy)]
pub(crate) struct Source<'a> {
    pub(crate) cache: &'a CacheStore,
    pub(crate) transport: &'a dyn Transport,
    pub(crate) timeout: Duration,
}

impl Source<'_> {
    /// Obtains the resource `id` located at `url`.
    ///
    /// Runs the policy's cache read, then the remote fetch if nothing was read,
    /// then the forced cache read if the fetch failed and the policy allows
    /// serving stale data. Failures are logged and end in `None`.
    pub(crate) fn acquire<T, P>(&self, policy: ModePolicy, id: &str, url: &str, parse: P) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        P: Fn(&str) -> Result<T, ParseError>,
    {
        let cached = match policy.read {
            CacheRead::Skip => None,
            CacheRead::Fresh => self.read(id, false),
            CacheRead::Force => self.read(id, true),
        };
        if cached.is_some() {
            tracing::debug!(id, "cache hit");
            return cached;
        }

        if policy.fetch {
            match self.fetch(url, &parse) {
                Ok(value) => {
                    if policy.write {
                        self.write(id, &value);
                    }
                    return Some(value);
                }
                Err(error) => tracing::warn!(id, %error, "remote fetch failed"),
            }
        }

        if policy.stale_fallback {
            let stale = self.read(id, true);
            if stale.is_some() {
                tracing::info!(id, "serving stale cache entry");
            }
            return stale;
        }
        None
    }

    fn fetch<T, P>(&self, url: &str, parse: &P) -> Result<T, SheetFeedError>
    where
        P: Fn(&str) -> Result<T, ParseError>,
    {
        tracing::debug!(url, "fetching");
        let body = self.transport.get(url, self.timeout)?;
        Ok(parse(&body)?)
    }

    /// Cache read where a corrupt or unreadable entry counts as a miss.
    fn read<T: DeserializeOwned>(&self, id: &str, force: bool) -> Option<T> {
        match self.cache.read(id, force) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(id, %error, "unreadable cache entry");
                None
            }
        }
    }

    /// Cache write whose failure leaves the fetched value usable.
    fn write<T: Serialize>(&self, id: &str, value: &T) {
        if let Err(error) = self.cache.write(id, value) {
            tracing::warn!(id, %error, "cache write failed");
        }
    }
}
