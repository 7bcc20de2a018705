//! Fetch EC2 instance metadata through IMDSv2 and render it as JSON.
//!
//! A fetch either resolves one key under `/latest/meta-data/` or walks the
//! whole tree depth-first, turning each directory listing into an ordered map.
//!
//! # Example
//!
//! ```ignore
//! use instance_metadata::{MetadataFetcher, Report};
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = match MetadataFetcher::new() {
//!         Ok(fetcher) => Report::from(fetcher.fetch(None).await),
//!         Err(err) => Report::from(Err(err)),
//!     };
//!     println!("{}", report.to_json_pretty().unwrap());
//! }
//! ```
//!
//! # Tree shape
//!
//! | Listing line | Result |
//! |--------------|--------|
//! | `name/` | nested object under `name` |
//! | `name`, value found | string |
//! | `name`, value 404 | `null` |

mod client;
mod error;
mod fetcher;
mod imds;
mod node;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{MetadataError, RequestFailure};
pub use fetcher::{FetcherConfig, MetadataFetcher, DEFAULT_TOKEN_TTL};
pub use node::{MetadataNode, Report};
