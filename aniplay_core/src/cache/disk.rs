//! On-disk poster cache tier
//!
//! Files live at `{cache_dir}/{key}{ext}` where the extension is taken
//! from the source URL, normalized into a small whitelist. Entries that
//! are undersized or fail to decode are treated as corrupt and deleted on
//! sight (self-healing).

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::paths;

use super::Poster;
use super::image_ops;

/// Extensions accepted verbatim from the source URL
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Extension used when the URL's suffix is not in the whitelist
const DEFAULT_EXTENSION: &str = "jpg";

/// Disk entries smaller than this are rejected as corrupt
const DEFAULT_MIN_FILE_BYTES: u64 = 1024;

/// The on-disk cache tier
pub struct DiskCache {
    dir: PathBuf,
    min_file_bytes: u64,
}

impl DiskCache {
    /// Open the disk cache under the given data directory
    ///
    /// Tries the preferred `cache/images` subpath first; if creation fails
    /// the sibling fallback directory is used instead.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let preferred = paths::image_cache_dir(data_dir);
        let dir = match std::fs::create_dir_all(&preferred) {
            Ok(()) => preferred,
            Err(e) => {
                log::error!("failed to create cache directory {}: {e}", preferred.display());
                let fallback = paths::image_cache_fallback_dir(data_dir);
                std::fs::create_dir_all(&fallback)?;
                fallback
            }
        };
        log::debug!("image cache directory: {}", dir.display());

        Ok(Self {
            dir,
            min_file_bytes: DEFAULT_MIN_FILE_BYTES,
        })
    }

    /// Override the corrupt-file size threshold
    pub fn with_min_file_bytes(mut self, min_file_bytes: u64) -> Self {
        self.min_file_bytes = min_file_bytes;
        self
    }

    /// The directory backing this cache
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derive the cache file path for a key and source URL
    pub fn entry_path(&self, key: &str, url: &str) -> PathBuf {
        let ext = Path::new(url)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        self.dir.join(format!("{key}.{ext}"))
    }

    /// Synchronously load and decode a cached entry
    ///
    /// Runs on the calling thread; bounded by local filesystem latency.
    /// Undersized or undecodable files are deleted and reported as a miss.
    pub fn load(&self, path: &Path, width: u32, height: u32) -> Option<Poster> {
        if !path.exists() {
            return None;
        }

        match std::fs::metadata(path) {
            Ok(meta) if meta.len() < self.min_file_bytes => {
                log::warn!("undersized cache entry {}, removing", path.display());
                std::fs::remove_file(path).ok();
                return None;
            }
            Err(e) => {
                log::warn!("failed to stat cache entry {}: {e}", path.display());
                return None;
            }
            Ok(_) => {}
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("failed to read cache entry {}: {e}", path.display());
                return None;
            }
        };

        match image_ops::decode_and_scale(&bytes, width, height) {
            Ok(poster) => {
                log::debug!("disk cache hit: {}", path.display());
                Some(poster)
            }
            Err(_) => {
                log::warn!("undecodable cache entry {}, removing", path.display());
                std::fs::remove_file(path).ok();
                None
            }
        }
    }

    /// Persist raw fetched bytes, creating parent directories as needed
    pub async fn store(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Remove every cached file that fails to decode, returning the count
    ///
    /// Intended to run once at startup.
    pub fn sweep_corrupt(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let undecodable = std::fs::read(&path)
                .ok()
                .is_none_or(|bytes| image::load_from_memory(&bytes).is_err());

            if undecodable {
                log::warn!("removing corrupt cache entry: {}", path.display());
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Remove cached files older than the given age, returning the count
    ///
    /// Never invoked automatically; callers trigger it explicitly.
    pub fn prune_older_than(&self, age: Duration) -> Result<usize> {
        let cutoff = SystemTime::now().checked_sub(age);
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let mut removed = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            if modified < cutoff {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Total size of the cache directory in bytes
    pub fn total_size_bytes(&self) -> Result<u64> {
        let mut total = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().is_file() {
                total += entry.metadata()?.len();
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::image_ops::encode_test_png;
    use tempfile::TempDir;

    fn open_cache(temp_dir: &TempDir) -> DiskCache {
        DiskCache::open(temp_dir.path()).unwrap()
    }

    #[test]
    fn test_open_creates_preferred_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);
        assert!(cache.dir().ends_with("cache/images"));
        assert!(cache.dir().exists());
    }

    #[test]
    fn test_entry_path_keeps_whitelisted_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/poster.png");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("42.png"));

        let path = cache.entry_path("42", "http://x/poster.WEBP");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("42.webp"));
    }

    #[test]
    fn test_entry_path_defaults_to_jpg() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/poster.gif");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("42.jpg"));

        let path = cache.entry_path("42", "http://x/poster");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("42.jpg"));
    }

    #[test]
    fn test_load_rejects_undersized_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/poster.png");
        std::fs::write(&path, b"tiny").unwrap();

        assert!(cache.load(&path, 200, 280).is_none());
        assert!(!path.exists(), "undersized entry should be deleted");
    }

    #[test]
    fn test_load_rejects_undecodable_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/poster.png");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        assert!(cache.load(&path, 200, 280).is_none());
        assert!(!path.exists(), "undecodable entry should be deleted");
    }

    #[test]
    fn test_load_decodes_and_scales_valid_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/poster.png");
        std::fs::write(&path, encode_test_png(400, 400)).unwrap();

        let poster = cache.load(&path, 200, 280).unwrap();
        assert_eq!((poster.width, poster.height), (200, 280));
        assert!(path.exists());
    }

    #[test]
    fn test_sweep_removes_only_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let good = cache.entry_path("good", "http://x/a.png");
        let bad = cache.entry_path("bad", "http://x/b.png");
        std::fs::write(&good, encode_test_png(64, 64)).unwrap();
        std::fs::write(&bad, vec![0u8; 2048]).unwrap();

        let removed = cache.sweep_corrupt().unwrap();
        assert_eq!(removed, 1);
        assert!(good.exists());
        assert!(!bad.exists());
    }

    #[test]
    fn test_prune_respects_age_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let path = cache.entry_path("42", "http://x/a.png");
        std::fs::write(&path, encode_test_png(64, 64)).unwrap();

        // Fresh file survives a 30-day prune
        assert_eq!(cache.prune_older_than(Duration::from_secs(86_400 * 30)).unwrap(), 0);
        assert!(path.exists());

        // Zero-age prune removes everything
        assert_eq!(cache.prune_older_than(Duration::ZERO).unwrap(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_total_size_counts_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        assert_eq!(cache.total_size_bytes().unwrap(), 0);

        let path = cache.entry_path("42", "http://x/a.png");
        std::fs::write(&path, vec![1u8; 5000]).unwrap();
        assert_eq!(cache.total_size_bytes().unwrap(), 5000);
    }
}
