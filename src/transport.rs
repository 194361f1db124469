//! Remote access to published spreadsheet feeds.
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;
use url::Url;

/// Errors of a remote GET.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network failure, timeout or unreadable body
    #[error("Request to '{url}' failed: {message}")]
    RequestError { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("Request to '{url}' returned status {status}")]
    StatusError { url: String, status: u16 },

    /// The server answered 2xx without a body
    #[error("No data from '{0}'")]
    EmptyBodyError(String),
}

/// Fetches a remote document. Abstraction over the HTTP client for testing.
pub trait Transport: Send + Sync {
    /// GET the URL and return the response body.
    /// Only a 2xx status with a non-empty body is a success.
    fn get(&self, url: &str, timeout: Duration) -> Result<String, TransportError>;
}

/// Blocking HTTP transport backed by `ureq`.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        HttpTransport { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, TransportError> {
        let request_error = |error: ureq::Error| TransportError::RequestError {
            url: url.to_owned(),
            message: error.to_string(),
        };
        let mut response = self
            .agent
            .get(url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            Err(TransportError::StatusError {
                url: url.to_owned(),
                status: status.as_u16(),
            })?;
        }
        let body = response.body_mut().read_to_string().map_err(request_error)?;
        if body.is_empty() {
            Err(TransportError::EmptyBodyError(url.to_owned()))?;
        }
        Ok(body)
    }
}

/// Checks if an identifier is a full remote address rather than a feed key.
pub fn is_remote_url(id: &str) -> bool {
    if let Ok(url) = Url::parse(id) {
        matches!(url.scheme(), "http" | "https")
    } else {
        false
    }
}
