//! Layered application configuration
//!
//! Defaults are defined in code, overridden by an optional TOML file and
//! `ANIPLAY_`-prefixed environment variables. The resulting [`AppConfig`]
//! is an explicitly constructed object handed to the subsystems that need
//! it; there is no process-wide configuration singleton.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// Token issuance settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthSection {
    /// Signing secret for session tokens. Override via
    /// `ANIPLAY_AUTH__TOKEN_SECRET` for any real installation.
    pub token_secret: String,
    /// Token lifetime in days
    pub token_ttl_days: i64,
}

/// Poster cache settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CacheSection {
    /// Number of concurrent poster fetch workers
    pub workers: usize,
    /// Network timeout for a single poster fetch, in seconds
    pub fetch_timeout_secs: u64,
    /// Target poster width after aspect-fill scaling
    pub target_width: u32,
    /// Target poster height after aspect-fill scaling
    pub target_height: u32,
    /// Disk entries smaller than this are treated as corrupt
    pub min_file_bytes: u64,
    /// Age threshold for the explicit prune operation, in days
    pub prune_age_days: u64,
}

/// Companion API server settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerSection {
    /// Base URL of the companion scraping API
    pub base_url: String,
    /// Maximum health-check attempts before giving up
    pub health_attempts: u32,
    /// Seconds between health-check attempts
    pub health_interval_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            token_secret: "aniplay-dev-secret".to_string(),
            token_ttl_days: 7,
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            workers: 3,
            fetch_timeout_secs: 10,
            target_width: 200,
            target_height: 280,
            min_file_bytes: 1024,
            prune_age_days: 30,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            health_attempts: 30,
            health_interval_secs: 2,
        }
    }
}

/// Configuration manager that handles platform paths and layered loading
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with the default platform config path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the default platform config path (`<config dir>/aniplay/config.toml`)
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("aniplay").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".aniplay/config.toml"))
    }

    /// Load configuration: defaults, then TOML file, then environment
    pub fn load(&self) -> Result<AppConfig> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.config_path))
            .merge(Env::prefixed("ANIPLAY_").split("__"));

        figment.extract().map_err(|e| {
            crate::error::Error::corrupt(format!("invalid configuration: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.auth.token_ttl_days, 7);
        assert_eq!(config.cache.workers, 3);
        assert_eq!(config.cache.fetch_timeout_secs, 10);
        assert_eq!(config.cache.target_width, 200);
        assert_eq!(config.cache.target_height, 280);
        assert_eq!(config.cache.min_file_bytes, 1024);
        assert_eq!(config.cache.prune_age_days, 30);
        assert_eq!(config.server.health_attempts, 30);
    }

    #[test]
    fn test_load_without_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("missing.toml"));
        let config = manager.load().unwrap();
        assert_eq!(config.cache.workers, 3);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nworkers = 5\n").unwrap();

        let manager = ConfigManager::with_path(path);
        let config = manager.load().unwrap();
        assert_eq!(config.cache.workers, 5);
        // Untouched sections keep defaults
        assert_eq!(config.auth.token_ttl_days, 7);
    }
}
