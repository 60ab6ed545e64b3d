//! Companion API commands

use anyhow::{Context, Result};
use colored::*;
use std::time::Duration;

use aniplay_core::{AppConfig, ServerMonitor};

/// Block until the companion scraping API reports healthy
pub async fn wait(config: &AppConfig) -> Result<()> {
    let monitor = ServerMonitor::with_schedule(
        config.server.base_url.clone(),
        config.server.health_attempts,
        Duration::from_secs(config.server.health_interval_secs),
    )
    .context("Failed to build the health-check client")?;

    println!("Waiting for {} ...", config.server.base_url);

    if monitor.wait_until_ready().await {
        println!("{} Companion API is ready", "✓".green());
        Ok(())
    } else {
        anyhow::bail!("companion API did not become ready in time")
    }
}
