//! AWS IMDSv2 protocol calls: session token and authenticated GETs.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::client::{read_text_limited, Endpoint, MetadataClient};
use crate::error::{MetadataError, RequestFailure};

/// AWS IMDSv2 token endpoint path.
pub(crate) const TOKEN_PATH: &str = "/latest/api/token";

/// Root of the instance metadata tree.
pub(crate) const META_DATA_PATH: &str = "/latest/meta-data/";

/// Token TTL header name.
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";

/// Token header name for requests.
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Get an IMDSv2 session token valid for `ttl`.
pub(crate) async fn get_token(
    client: &MetadataClient,
    ttl: Duration,
    max_size: Option<usize>,
) -> Result<String, MetadataError> {
    let url = format!("{}{}", client.base_url(), TOKEN_PATH);
    debug!(ttl_secs = ttl.as_secs(), "requesting metadata session token");

    let response = client
        .inner()
        .put(&url)
        .header(TOKEN_TTL_HEADER, ttl.as_secs().to_string())
        .send()
        .await
        .map_err(|e| Endpoint::Token.fail(RequestFailure::Transport(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Endpoint::Token.fail(RequestFailure::Http(status.as_u16())));
    }

    read_text_limited(response, max_size, Endpoint::Token).await
}

/// GET a path relative to the metadata root.
///
/// Returns `Ok(None)` on 404 so callers can decide whether a missing key is
/// an error; every other non-success status is an error.
pub(crate) async fn get_metadata(
    client: &MetadataClient,
    token: &str,
    path: &str,
    max_size: Option<usize>,
) -> Result<Option<String>, MetadataError> {
    let url = format!("{}{}{}", client.base_url(), META_DATA_PATH, path);
    let endpoint = Endpoint::Metadata(path);
    debug!(path, "fetching metadata");

    let response = client
        .inner()
        .get(&url)
        .header(TOKEN_HEADER, token)
        .send()
        .await
        .map_err(|e| endpoint.fail(RequestFailure::Transport(e)))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(endpoint.fail(RequestFailure::Http(status.as_u16())));
    }

    read_text_limited(response, max_size, endpoint)
        .await
        .map(Some)
}

/// GET a path that must exist: 404 is reported as a failure like any other
/// non-success status.
pub(crate) async fn get_required(
    client: &MetadataClient,
    token: &str,
    path: &str,
    max_size: Option<usize>,
) -> Result<String, MetadataError> {
    get_metadata(client, token, path, max_size)
        .await?
        .ok_or_else(|| {
            Endpoint::Metadata(path).fail(RequestFailure::Http(StatusCode::NOT_FOUND.as_u16()))
        })
}
