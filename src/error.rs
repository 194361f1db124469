use thiserror::Error;

/// Main error type for the sheet feed library.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum SheetFeedError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    TomlError(#[from] toml::de::Error),

    // Module errors
    #[error("{0}")]
    ParseError(#[from] crate::feed::ParseError),

    #[error("{0}")]
    CacheError(#[from] crate::cache::CacheError),

    #[error("{0}")]
    TransportError(#[from] crate::transport::TransportError),

    #[error("{0}")]
    LoadModeError(#[from] crate::loader::LoadModeError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetFeedError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetFeedError::WithContextError(format!("{}: {}", message, e)))
    }
}
