//! AniPlay Core Library
//!
//! Core subsystems of the AniPlay desktop client: the credential & session
//! manager (registration, login, signed tokens, durable sessions) and the
//! poster acquisition cache (memory/disk/network tiers with single-flight
//! fetch coordination). The GUI shell, the site scraper and the companion
//! scraping API are external collaborators; this crate only consumes
//! "bytes for a URL" and "are you healthy" from them.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod monitor;
pub mod paths;

// Re-export main types
pub use auth::{AuthConfig, AuthSystem, Claims, TokenManager};
pub use cache::{
    CacheEvent, CacheOptions, CacheStats, HttpPosterFetcher, ImageCacheManager, Lookup, Poster,
    PosterFetcher,
};
pub use config::{AppConfig, ConfigManager};
pub use db::{Preferences, UserInfo};
pub use error::{Error, Result};
pub use monitor::ServerMonitor;
