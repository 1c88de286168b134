use reqwest::StatusCode;
use std::path::PathBuf;

// Error type for cache and fetch operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned status code {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Server answered 304 Not Modified to an unconditional request for {0}")]
    UnexpectedNotModified(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid HTTP date '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Path has no file name: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Invalid proxy configuration: {0}")]
    Proxy(String),
}

impl CacheError {
    /// Whether a fresh attempt at the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CacheError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
