//! Feed retrieval errors.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while retrieving a stats feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed location could not be understood.
    #[error("invalid feed source {input:?}: {reason}")]
    InvalidSource { input: String, reason: String },

    /// The location uses a scheme no fetcher handles.
    #[error("unsupported scheme {0:?}, expected unix, file, http or https")]
    UnsupportedScheme(String),

    /// Socket or file I/O failed.
    #[error("error reading {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client construction or transfer failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The stats page answered with an error status.
    #[error("server responded with status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The feed exceeds the configured size bound.
    #[error("feed from {target} exceeds {limit} bytes")]
    TooLarge { target: String, limit: u64 },

    /// The retrieval did not complete in time.
    #[error("timed out after {after:?} fetching {target}")]
    Timeout { target: String, after: Duration },

    /// TLS material could not be loaded.
    #[error("invalid TLS material in {path}: {source}")]
    Tls {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
