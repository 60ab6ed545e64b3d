//! Three-tier poster cache with single-flight fetch coordination
//!
//! Lookup order is fixed: memory map, then disk (validating, synchronous),
//! then network. The pending set guarantees at most one in-flight fetch
//! per key; fetch tasks run under a fixed-size semaphore and report back
//! through a single event channel. The channel's consumer is the UI-owning
//! loop: it calls [`ImageCacheManager::handle_event`] for each event
//! before touching any widget, which is the one place a key leaves the
//! pending set.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{RwLock, Semaphore};

use crate::error::Result;

use super::disk::DiskCache;
use super::fetcher::PosterFetcher;
use super::image_ops;
use super::{CacheEvent, CacheStats, Lookup, Poster};

/// Tuning knobs for the poster cache
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Number of concurrent fetch workers
    pub workers: usize,
    /// Target poster width after aspect-fill scaling
    pub target_width: u32,
    /// Target poster height after aspect-fill scaling
    pub target_height: u32,
    /// Disk entries smaller than this are treated as corrupt
    pub min_file_bytes: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            workers: 3,
            target_width: 200,
            target_height: 280,
            min_file_bytes: 1024,
        }
    }
}

/// The poster acquisition cache
pub struct ImageCacheManager {
    disk: Arc<DiskCache>,
    fetcher: Arc<dyn PosterFetcher>,
    memory: Arc<RwLock<HashMap<String, Arc<Poster>>>>,
    pending: Arc<RwLock<HashSet<String>>>,
    permits: Arc<Semaphore>,
    events_tx: UnboundedSender<CacheEvent>,
    stats: Arc<RwLock<CacheStats>>,
    options: CacheOptions,
}

impl ImageCacheManager {
    /// Create a manager rooted at the given data directory
    ///
    /// Returns the manager together with the receiving half of the event
    /// channel. The caller owns the receiver and must feed every received
    /// event through [`handle_event`](Self::handle_event).
    pub fn new(
        data_dir: &Path,
        fetcher: Arc<dyn PosterFetcher>,
        options: CacheOptions,
    ) -> Result<(Self, UnboundedReceiver<CacheEvent>)> {
        let disk = DiskCache::open(data_dir)?.with_min_file_bytes(options.min_file_bytes);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let manager = Self {
            disk: Arc::new(disk),
            fetcher,
            memory: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(RwLock::new(HashSet::new())),
            permits: Arc::new(Semaphore::new(options.workers)),
            events_tx,
            stats: Arc::new(RwLock::new(CacheStats::default())),
            options,
        };

        Ok((manager, events_rx))
    }

    /// Request the poster for `key`, fetching from `url` on a full miss
    ///
    /// Tiers are checked in order and the first hit short-circuits:
    /// memory (no I/O), disk (synchronous, validating), in-flight check,
    /// network fetch. The disk check runs on the calling task and blocks
    /// briefly on local file I/O.
    pub async fn request(&self, key: &str, url: &str) -> Result<Lookup> {
        let key = key.trim().to_string();

        // 1. Memory tier
        if let Some(poster) = self.memory.read().await.get(&key).cloned() {
            self.stats.write().await.hit_count += 1;
            return Ok(Lookup::Ready(poster));
        }

        // 2. Disk tier
        let path = self.disk.entry_path(&key, url);
        if let Some(poster) =
            self.disk
                .load(&path, self.options.target_width, self.options.target_height)
        {
            let poster = Arc::new(poster);
            self.memory.write().await.insert(key, poster.clone());
            self.stats.write().await.hit_count += 1;
            return Ok(Lookup::Ready(poster));
        }

        // 3. In-flight check; insertion doubles as the check so two racing
        //    callers cannot both dispatch
        if !self.pending.write().await.insert(key.clone()) {
            return Ok(Lookup::InFlight);
        }

        self.stats.write().await.miss_count += 1;

        // 4. Network fetch under the worker semaphore
        let disk = self.disk.clone();
        let fetcher = self.fetcher.clone();
        let permits = self.permits.clone();
        let events_tx = self.events_tx.clone();
        let url = url.to_string();
        let (width, height) = (self.options.target_width, self.options.target_height);

        tokio::spawn(async move {
            // Semaphore is never closed while the manager lives
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            // Decode before persisting so an HTTP 200 with a broken body
            // never leaves a corrupt file behind
            let result: Result<Poster> = async {
                let bytes = fetcher.fetch(&url).await?;
                let poster = image_ops::decode_and_scale(&bytes, width, height)?;
                disk.store(&path, &bytes).await?;
                Ok(poster)
            }
            .await;

            // The pending set is NOT touched here: removal happens exactly
            // once, in handle_event, so callers never observe a key that is
            // neither pending nor resolved.
            let event = match result {
                Ok(poster) => CacheEvent::Loaded {
                    key,
                    poster: Arc::new(poster),
                },
                Err(e) => CacheEvent::Failed {
                    key,
                    reason: e.to_string(),
                },
            };
            let _ = events_tx.send(event);
        });

        Ok(Lookup::Fetching)
    }

    /// Apply a completion event to the cache state
    ///
    /// Must be called by the event-channel consumer for every event, before
    /// the UI reacts to it. Removes the key from the pending set (the only
    /// removal site) and, on success, publishes the poster to the memory
    /// tier.
    pub async fn handle_event(&self, event: &CacheEvent) {
        self.pending.write().await.remove(event.key());

        match event {
            CacheEvent::Loaded { key, poster } => {
                self.memory
                    .write()
                    .await
                    .insert(key.clone(), poster.clone());
            }
            CacheEvent::Failed { key, reason } => {
                self.stats.write().await.failed_count += 1;
                log::warn!("poster fetch failed for {key}: {reason}");
            }
        }
    }

    /// Drop every entry in the memory tier
    ///
    /// Disk entries and in-flight fetches are unaffected.
    pub async fn invalidate_memory(&self) {
        self.memory.write().await.clear();
    }

    /// Wait briefly for in-flight fetches to drain
    ///
    /// Bounded: returns after at most `grace`, whether or not the pending
    /// set emptied. Intended for application shutdown.
    pub async fn shutdown(&self, grace: Duration) {
        let pending = self.pending.clone();
        let drained = tokio::time::timeout(grace, async move {
            loop {
                if pending.read().await.is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await;

        if drained.is_err() {
            log::warn!("shutting down with poster fetches still in flight");
        }
    }

    /// Current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().await.clone();
        stats.entry_count = self.memory.read().await.len();
        stats.pending_count = self.pending.read().await.len();
        stats
    }

    /// Remove undecodable disk entries (startup maintenance)
    pub fn sweep_corrupt(&self) -> Result<usize> {
        self.disk.sweep_corrupt()
    }

    /// Remove disk entries older than `age` (explicit maintenance only)
    pub fn prune_older_than(&self, age: Duration) -> Result<usize> {
        self.disk.prune_older_than(age)
    }

    /// Total size of the disk tier in bytes
    pub fn disk_size_bytes(&self) -> Result<u64> {
        self.disk.total_size_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::image_ops::encode_test_png;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StaticFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn png() -> Self {
            Self {
                body: encode_test_png(400, 560),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PosterFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(self.body.clone()))
        }
    }

    #[tokio::test]
    async fn test_miss_dispatches_fetch_and_fills_memory() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::png());
        let (manager, mut events) = ImageCacheManager::new(
            temp_dir.path(),
            fetcher.clone(),
            CacheOptions::default(),
        )
        .unwrap();

        let lookup = manager.request("42", "http://x/img.png").await.unwrap();
        assert!(matches!(lookup, Lookup::Fetching));
        assert_eq!(manager.stats().await.pending_count, 1);

        let event = events.recv().await.unwrap();
        manager.handle_event(&event).await;

        match event {
            CacheEvent::Loaded { key, poster } => {
                assert_eq!(key, "42");
                assert_eq!((poster.width, poster.height), (200, 280));
            }
            CacheEvent::Failed { reason, .. } => panic!("fetch failed: {reason}"),
        }

        let stats = manager.stats().await;
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        // HTTP success, but the body is not an image
        let fetcher = Arc::new(StaticFetcher {
            body: vec![0u8; 4096],
            calls: AtomicUsize::new(0),
        });
        let (manager, mut events) = ImageCacheManager::new(
            temp_dir.path(),
            fetcher,
            CacheOptions::default(),
        )
        .unwrap();

        let url = "http://x/img.png";
        manager.request("42", url).await.unwrap();

        let event = events.recv().await.unwrap();
        manager.handle_event(&event).await;
        assert!(matches!(event, CacheEvent::Failed { .. }));

        // Nothing was written to the disk tier
        assert!(!manager.disk.entry_path("42", url).exists());
        assert_eq!(manager.disk.total_size_bytes().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_hit_after_fetch_is_synchronous() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::png());
        let (manager, mut events) = ImageCacheManager::new(
            temp_dir.path(),
            fetcher.clone(),
            CacheOptions::default(),
        )
        .unwrap();

        manager.request("42", "http://x/img.png").await.unwrap();
        let event = events.recv().await.unwrap();
        manager.handle_event(&event).await;

        let lookup = manager.request("42", "http://x/img.png").await.unwrap();
        assert!(matches!(lookup, Lookup::Ready(_)));
        // No second fetch
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_trimmed() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::png());
        let (manager, mut events) =
            ImageCacheManager::new(temp_dir.path(), fetcher, CacheOptions::default()).unwrap();

        manager.request("  42  ", "http://x/img.png").await.unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event.key(), "42");
        manager.handle_event(&event).await;

        let lookup = manager.request("42", "http://x/img.png").await.unwrap();
        assert!(matches!(lookup, Lookup::Ready(_)));
    }

    #[tokio::test]
    async fn test_invalidate_memory_falls_back_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::png());
        let (manager, mut events) = ImageCacheManager::new(
            temp_dir.path(),
            fetcher.clone(),
            CacheOptions::default(),
        )
        .unwrap();

        manager.request("42", "http://x/img.png").await.unwrap();
        let event = events.recv().await.unwrap();
        manager.handle_event(&event).await;

        manager.invalidate_memory().await;
        assert_eq!(manager.stats().await.entry_count, 0);

        // Disk tier still has the raw bytes; no new network fetch
        let lookup = manager.request("42", "http://x/img.png").await.unwrap();
        assert!(matches!(lookup, Lookup::Ready(_)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
