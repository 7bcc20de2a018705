//! HTTP client wrapper for metadata requests.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{MetadataError, RequestFailure};

/// Default timeout for a single metadata request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default metadata service base URL (link-local address).
pub const DEFAULT_BASE_URL: &str = "http://169.254.169.254";

/// HTTP client wrapper for metadata service requests.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    inner: Client,
    base_url: String,
}

impl MetadataClient {
    /// Create a new metadata client with the specified timeout and base URL.
    pub fn new(timeout: Duration, base_url: &str) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(false)
            .build()?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Which endpoint a response came from, so failures carry the right context.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Endpoint<'a> {
    Token,
    Metadata(&'a str),
}

impl Endpoint<'_> {
    pub(crate) fn fail(self, source: RequestFailure) -> MetadataError {
        match self {
            Endpoint::Token => MetadataError::TokenRequestFailed(source),
            Endpoint::Metadata(path) => MetadataError::MetadataRequestFailed {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Read response body with an optional size limit.
///
/// If `max_size` is `Some`, this will:
/// 1. Check the `Content-Length` header and fail early if it exceeds the limit
/// 2. Read the body with a pre-allocated capped buffer, aborting immediately if exceeded
pub(crate) async fn read_body_limited(
    response: Response,
    max_size: Option<usize>,
    endpoint: Endpoint<'_>,
) -> Result<Vec<u8>, MetadataError> {
    let transport = |err: reqwest::Error| endpoint.fail(RequestFailure::Transport(err));

    let Some(max_size) = max_size else {
        return Ok(response.bytes().await.map_err(transport)?.to_vec());
    };

    if let Some(content_length) = response.content_length() {
        if content_length as usize > max_size {
            return Err(MetadataError::TooLarge(content_length as usize, max_size));
        }
    }

    // Capacity is capped even if Content-Length is missing or wrong
    let capacity = response
        .content_length()
        .map(|cl| (cl as usize).min(max_size))
        .unwrap_or(max_size.min(8192));
    let mut body = Vec::with_capacity(capacity);
    let mut total_read = 0usize;

    let mut stream = response;
    while let Some(chunk) = stream.chunk().await.map_err(transport)? {
        if total_read.saturating_add(chunk.len()) > max_size {
            return Err(MetadataError::TooLarge(
                total_read.saturating_add(chunk.len()),
                max_size,
            ));
        }
        total_read += chunk.len();
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Read the body as text, honoring the size limit.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub(crate) async fn read_text_limited(
    response: Response,
    max_size: Option<usize>,
    endpoint: Endpoint<'_>,
) -> Result<String, MetadataError> {
    let body = read_body_limited(response, max_size, endpoint).await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
