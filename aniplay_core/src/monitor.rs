//! Companion API readiness polling
//!
//! The scraping API runs as a separate process; the only contract the core
//! has with it is "tell me when you're healthy". The monitor polls the
//! health endpoint on a background task and publishes the outcome through
//! a watch channel.

use std::time::Duration;

use tokio::sync::watch;

use crate::error::Result;

/// Polls a companion server's health endpoint until it responds
pub struct ServerMonitor {
    base_url: String,
    max_attempts: u32,
    interval: Duration,
    client: reqwest::Client,
}

impl ServerMonitor {
    /// Create a monitor for the given base URL
    ///
    /// Reference behavior: up to 30 attempts, 2 seconds apart, each with a
    /// 2-second request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_schedule(base_url, 30, Duration::from_secs(2))
    }

    /// Create a monitor with an explicit attempt schedule
    pub fn with_schedule(
        base_url: impl Into<String>,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            max_attempts,
            interval,
            client,
        })
    }

    /// Poll until the server reports healthy or attempts run out
    ///
    /// Returns `true` if a health check succeeded.
    pub async fn wait_until_ready(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        for attempt in 1..=self.max_attempts {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    log::info!("companion API is ready");
                    return true;
                }
                Ok(response) => {
                    log::debug!("health check returned {}", response.status());
                }
                Err(e) => {
                    log::debug!("health check failed: {e}");
                }
            }

            log::info!("waiting for companion API ({attempt}/{})", self.max_attempts);
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        log::error!("companion API did not become ready in time");
        false
    }

    /// Run the readiness poll on a background task
    ///
    /// The returned receiver starts at `false` and flips exactly once when
    /// polling concludes.
    pub fn spawn(self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            let ready = self.wait_until_ready().await;
            let _ = tx.send(ready);
        });

        rx
    }
}
