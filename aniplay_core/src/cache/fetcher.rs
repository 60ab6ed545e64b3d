//! Poster byte fetching
//!
//! The cache's only contract with the outside network is "give me bytes
//! for a URL", expressed as the [`PosterFetcher`] trait so tests can
//! substitute counting or failing doubles.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::error::{IoError, Result};

/// Fetches raw poster bytes for a URL
#[async_trait]
pub trait PosterFetcher: Send + Sync {
    /// Fetch the body at `url`
    ///
    /// Returns the raw bytes on HTTP success; non-success statuses,
    /// timeouts and transport failures are errors.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// HTTP fetcher with a bounded per-request timeout
pub struct HttpPosterFetcher {
    client: reqwest::Client,
}

impl HttpPosterFetcher {
    /// Build a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PosterFetcher for HttpPosterFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IoError::network(format!("HTTP {status}")).into());
        }

        Ok(response.bytes().await?)
    }
}
