//! Poster acquisition and caching
//!
//! Given an anime id and a source URL, produces a decoded, pre-scaled
//! poster bitmap through three tiers checked in order: in-memory map,
//! on-disk file, network fetch. Concurrent requests for the same key
//! collapse into a single fetch (single-flight), bounded by a fixed-size
//! worker pool.

pub mod disk;
pub mod fetcher;
pub mod image_ops;
pub mod manager;

use std::sync::Arc;

pub use disk::DiskCache;
pub use fetcher::{HttpPosterFetcher, PosterFetcher};
pub use manager::{CacheOptions, ImageCacheManager};

/// A decoded, aspect-fill-scaled poster bitmap (RGB8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    /// Raw RGB8 pixel data, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Poster {
    /// Create a poster from raw RGB8 data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// Completion event for an asynchronous poster fetch
///
/// Events are key-tagged and delivered on a single channel consumed by the
/// UI-owning loop, so every view interested in a key observes its
/// completion.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// Fetch succeeded; the poster is ready for display
    Loaded { key: String, poster: Arc<Poster> },
    /// Fetch failed terminally; the UI should show a placeholder
    Failed { key: String, reason: String },
}

impl CacheEvent {
    /// The cache key this event is about
    pub fn key(&self) -> &str {
        match self {
            Self::Loaded { key, .. } | Self::Failed { key, .. } => key,
        }
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Hit in the memory or disk tier; the poster is available now
    Ready(Arc<Poster>),
    /// Miss everywhere; a fetch task was dispatched for this key
    Fetching,
    /// A fetch for this key is already in flight; the completion event
    /// will arrive on the shared channel
    InFlight,
}

/// Cache usage statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Entries currently held in the memory tier
    pub entry_count: usize,
    /// Keys with an in-flight fetch
    pub pending_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub failed_count: u64,
}
