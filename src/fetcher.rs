//! MetadataFetcher struct and core traversal.

use std::time::Duration;

use tracing::debug;

use crate::client::{MetadataClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::MetadataError;
use crate::imds;
use crate::node::MetadataNode;

/// Default lifetime requested for the session token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(21600);

/// Settings for a [`MetadataFetcher`]. Defaults target the real service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Scheme and host of the metadata service.
    pub base_url: String,
    /// Timeout applied to each request, not to a whole traversal.
    pub timeout: Duration,
    /// Lifetime requested for the session token.
    pub token_ttl: Duration,
    /// Upper bound on any single response body.
    pub max_size: Option<usize>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token_ttl: DEFAULT_TOKEN_TTL,
            max_size: None,
        }
    }
}

/// Fetches one key or the whole `meta-data` tree from the instance metadata
/// service.
///
/// Every call to [`fetch`](Self::fetch) obtains a fresh session token and then
/// issues its requests one at a time.
///
/// # Example
///
/// ```ignore
/// use instance_metadata::{MetadataError, MetadataFetcher};
///
/// #[tokio::main]
/// async fn main() -> Result<(), MetadataError> {
///     let fetcher = MetadataFetcher::new()?;
///     let node = fetcher.fetch(Some("instance-id")).await?;
///     println!("{:?}", node.get("instance-id"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MetadataFetcher {
    client: MetadataClient,
    token_ttl: Duration,
    max_size: Option<usize>,
}

impl MetadataFetcher {
    /// Create a fetcher for the real metadata service.
    pub fn new() -> Result<Self, MetadataError> {
        Self::from_config(FetcherConfig::default())
    }

    /// Create a fetcher against a custom base URL.
    ///
    /// This is primarily useful for testing with mock servers.
    pub fn with_base_url(base_url: &str) -> Result<Self, MetadataError> {
        Self::from_config(FetcherConfig {
            base_url: base_url.to_string(),
            ..FetcherConfig::default()
        })
    }

    /// Create a fetcher from explicit settings.
    pub fn from_config(config: FetcherConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            client: MetadataClient::new(config.timeout, &config.base_url)?,
            token_ttl: config.token_ttl,
            max_size: config.max_size,
        })
    }

    /// Set the maximum size limit for each response body.
    ///
    /// If a response exceeds this limit, `MetadataError::TooLarge` is returned.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Set the lifetime requested for session tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Fetch a single key, or the whole tree when `key` is `None` or empty.
    ///
    /// A single key resolves to a one-entry directory `{key: body}` and any
    /// non-success status for it (404 included) is an error. The tree walk
    /// records listed leaves that answer 404 as [`MetadataNode::Absent`].
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::TokenRequestFailed` if no token could be
    /// obtained, in which case no metadata request is made. Any other failure
    /// aborts the whole operation; partial trees are never returned.
    pub async fn fetch(&self, key: Option<&str>) -> Result<MetadataNode, MetadataError> {
        let token = imds::get_token(&self.client, self.token_ttl, self.max_size).await?;

        match key.filter(|k| !k.is_empty()) {
            Some(key) => {
                let path = key.trim_start_matches('/');
                let value = imds::get_required(&self.client, &token, path, self.max_size).await?;
                Ok(MetadataNode::Directory(vec![(
                    key.to_string(),
                    MetadataNode::Value(value),
                )]))
            }
            None => self.fetch_tree(&token, "").await,
        }
    }

    /// Depth-first walk of the directory at `dir` (empty for the root, else
    /// ending in `/`).
    ///
    /// Every listing line becomes a child, a blank one included. A name listed
    /// again keeps its first position and takes the later value.
    async fn fetch_tree(&self, token: &str, dir: &str) -> Result<MetadataNode, MetadataError> {
        let listing = imds::get_required(&self.client, token, dir, self.max_size).await?;
        let mut entries: Vec<(String, MetadataNode)> = Vec::new();

        for name in listing.lines() {
            let path = format!("{dir}{name}");
            let (key, node) = match name.strip_suffix('/') {
                Some(child) => {
                    let subtree = Box::pin(self.fetch_tree(token, &path)).await?;
                    (child.to_string(), subtree)
                }
                None => {
                    let node =
                        match imds::get_metadata(&self.client, token, &path, self.max_size).await? {
                            Some(value) => MetadataNode::Value(value),
                            None => {
                                debug!(path = %path, "listed key has no value");
                                MetadataNode::Absent
                            }
                        };
                    (name.to_string(), node)
                }
            };
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = node,
                None => entries.push((key, node)),
            }
        }

        Ok(MetadataNode::Directory(entries))
    }
}
