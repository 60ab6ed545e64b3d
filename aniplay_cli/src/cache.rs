//! Poster cache maintenance commands
//!
//! These operate on the disk tier directly; the in-memory tier only exists
//! inside a running client.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::time::Duration;

use aniplay_core::AppConfig;
use aniplay_core::cache::DiskCache;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

fn open_disk(config: &AppConfig, data_dir: &Path) -> Result<DiskCache> {
    Ok(DiskCache::open(data_dir)
        .context("Failed to open the poster cache directory")?
        .with_min_file_bytes(config.cache.min_file_bytes))
}

/// Print disk tier statistics
pub fn stats(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let disk = open_disk(config, data_dir)?;
    let total = disk.total_size_bytes()?;

    println!("Poster cache: {}", disk.dir().display());
    println!("Total size:   {:.1} MiB", total as f64 / (1024.0 * 1024.0));
    Ok(())
}

/// Remove corrupt poster files (undersized or undecodable)
pub fn clean(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let disk = open_disk(config, data_dir)?;
    let removed = disk.sweep_corrupt()?;

    if removed == 0 {
        println!("No corrupt poster files found.");
    } else {
        println!("{} Removed {removed} corrupt poster file(s)", "✓".green());
    }
    Ok(())
}

/// Remove poster files older than the cutoff
pub fn prune(config: &AppConfig, data_dir: &Path, days: u64) -> Result<()> {
    let disk = open_disk(config, data_dir)?;
    let removed = disk.prune_older_than(Duration::from_secs(days * SECS_PER_DAY))?;

    if removed == 0 {
        println!("No poster files older than {days} day(s).");
    } else {
        println!("{} Removed {removed} poster file(s) older than {days} day(s)", "✓".green());
    }
    Ok(())
}
