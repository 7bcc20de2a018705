//! Error types for instance metadata operations.

use thiserror::Error;

/// Why a single HTTP request to the metadata service failed.
#[derive(Debug, Error)]
pub enum RequestFailure {
    /// The service answered with a non-success status code.
    #[error("http {0}")]
    Http(u16),

    /// The request never produced a usable response (connection refused,
    /// timeout, DNS failure, broken body stream).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl RequestFailure {
    /// Status code of the response, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestFailure::Http(code) => Some(*code),
            RequestFailure::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

/// Errors that can occur when fetching instance metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The session token could not be obtained.
    #[error("token request failed: {0}")]
    TokenRequestFailed(RequestFailure),

    /// A metadata listing or value request failed.
    #[error("request for {path:?} failed: {source}")]
    MetadataRequestFailed {
        path: String,
        #[source]
        source: RequestFailure,
    },

    /// Response exceeds maximum allowed size.
    #[error("response too large: {0} bytes exceeds limit of {1} bytes")]
    TooLarge(usize, usize),

    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
