use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to load mode selection.
#[derive(Error, Debug, PartialEq)]
pub enum LoadModeError {
    #[error("Unknown load mode '{0}'")]
    UnknownMode(String),
}

/// How a request combines the cache and the remote source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Fresh cache, else fetch and store, else stale cache
    #[default]
    Load,
    /// Always fetch and store
    Update,
    /// Cache only, regardless of age
    Cache,
    /// Always fetch, never store
    Fetch,
}

/// Which cache read a mode starts with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CacheRead {
    Skip,
    Fresh,
    Force,
}

/// One row of the mode table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ModePolicy {
    /// Initial cache read
    pub(crate) read: CacheRead,
    /// Fetch from the remote source when the read yields nothing
    pub(crate) fetch: bool,
    /// Store a successful fetch
    pub(crate) write: bool,
    /// Serve an expired entry when the fetch fails
    pub(crate) stale_fallback: bool,
}

impl LoadMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LoadMode::Load => "load",
            LoadMode::Update => "update",
            LoadMode::Cache => "cache",
            LoadMode::Fetch => "fetch",
        }
    }

    /// The mode table. `use_cache` only affects `load`, which then skips its
    /// initial read but keeps storing and the stale fallback.
    pub(crate) const fn policy(&self, use_cache: bool) -> ModePolicy {
        match self {
            LoadMode::Load => ModePolicy {
                read: if use_cache { CacheRead::Fresh } else { CacheRead::Skip },
                fetch: true,
                write: true,
                stale_fallback: true,
            },
            LoadMode::Update => ModePolicy {
                read: CacheRead::Skip,
                fetch: true,
                write: true,
                stale_fallback: false,
            },
            LoadMode::Cache => ModePolicy {
                read: CacheRead::Force,
                fetch: false,
                write: false,
                stale_fallback: false,
            },
            LoadMode::Fetch => ModePolicy {
                read: CacheRead::Skip,
                fetch: true,
                write: false,
                stale_fallback: false,
            },
        }
    }
}

impl FromStr for LoadMode {
    type Err = LoadModeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "load" => Ok(LoadMode::Load),
            "update" => Ok(LoadMode::Update),
            "cache" => Ok(LoadMode::Cache),
            "fetch" => Ok(LoadMode::Fetch),
            _ => Err(LoadModeError::UnknownMode(name.to_owned())),
        }
    }
}

impl Display for LoadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
