//! Fetch-if-absent of route log files
//!
//! A route that already exists in the data directory is never fetched again
//! and is not checked for integrity or staleness.

mod http;

pub use http::HttpFetcher;

use crate::error::ReplayResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result of making sure a route file is available locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// File was already on disk; no request was made
    Present,
    /// File was downloaded and written to disk
    Downloaded { bytes: u64 },
    /// Server answered with a non-success status; nothing was written
    HttpStatus(u16),
}

impl FetchOutcome {
    /// Whether the route file is expected to exist afterwards
    pub fn is_available(&self) -> bool {
        !matches!(self, FetchOutcome::HttpStatus(_))
    }
}

/// Makes route files available in a local directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteFetcher: Send + Sync {
    /// Ensure `dir/route` exists, downloading it if needed
    async fn ensure_fetched(&self, route: &str, dir: &Path) -> ReplayResult<FetchOutcome>;
}

/// Local path of a route inside the data directory
pub fn route_path(dir: &Path, route: &str) -> PathBuf {
    dir.join(route)
}

/// Temporary path a download is streamed to before being renamed into place
pub(crate) fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
