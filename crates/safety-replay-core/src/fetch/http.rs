//! HTTP route fetcher

use super::{FetchOutcome, RouteFetcher, partial_path, route_path};
use crate::error::{ReplayError, ReplayResult};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Downloads missing routes with a single unauthenticated GET each
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for `base_url`; the route is appended verbatim
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ReplayResult<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("safety-replay/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn download(&self, url: &str, target: &Path) -> ReplayResult<FetchOutcome> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}, nothing written", url, status);
            return Ok(FetchOutcome::HttpStatus(status.as_u16()));
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ReplayError::io_with_path(e.to_string(), parent.display().to_string())
            })?;
        }

        let part = partial_path(target);
        let bytes = match write_body(response, &part).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&part).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!("Could not remove {}: {}", part.display(), rm);
                    }
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&part, target)
            .await
            .map_err(|e| ReplayError::io_with_path(e.to_string(), target.display().to_string()))?;

        Ok(FetchOutcome::Downloaded { bytes })
    }
}

/// Stream a response body into `part`, returning the byte count
async fn write_body(response: Response, part: &Path) -> ReplayResult<u64> {
    let io_error =
        |e: std::io::Error| ReplayError::io_with_path(e.to_string(), part.display().to_string());

    let mut file = tokio::fs::File::create(part).await.map_err(io_error)?;
    let mut bytes = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(io_error)?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;
    Ok(bytes)
}

#[async_trait]
impl RouteFetcher for HttpFetcher {
    async fn ensure_fetched(&self, route: &str, dir: &Path) -> ReplayResult<FetchOutcome> {
        let target = route_path(dir, route);
        let present = tokio::fs::metadata(&target)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if present {
            debug!("{} already present, skipping download", target.display());
            return Ok(FetchOutcome::Present);
        }

        let url = self.url_for(route);
        info!("Downloading {}", url);
        let outcome = self.download(&url, &target).await?;
        if let FetchOutcome::Downloaded { bytes } = outcome {
            info!("Wrote {} bytes to {}", bytes, target.display());
        }
        Ok(outcome)
    }
}
