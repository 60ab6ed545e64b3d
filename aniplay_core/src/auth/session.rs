//! Durable session persistence
//!
//! A single JSON file per installation holds the last successful login:
//! user id, token and save timestamp. The file is overwritten wholesale on
//! each save and deleted on logout or when found invalid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::paths;

/// On-disk session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: i64,
    pub token: String,
    /// ISO-8601 save timestamp
    pub saved_at: String,
}

/// Stores at most one session per installation
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at the given data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: paths::session_path(data_dir),
        }
    }

    /// Persist a session, replacing any previous one
    pub async fn save(&self, user_id: i64, token: &str) -> Result<()> {
        let record = SessionRecord {
            user_id,
            token: token.to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(&record)
            .map_err(|e| crate::error::Error::corrupt(format!("session encode failed: {e}")))?;

        // Write to a temporary file first, then rename into place
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;

        log::info!("session saved for user {user_id}");
        Ok(())
    }

    /// Load the raw session record, if one exists and parses
    ///
    /// A malformed file is deleted (self-healing) and reported as absent.
    /// Token re-verification is the caller's job.
    pub async fn load(&self) -> Option<SessionRecord> {
        if !self.path.exists() {
            return None;
        }

        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                log::error!("failed to read session file: {e}");
                return None;
            }
        };

        match serde_json::from_slice::<SessionRecord>(&data) {
            Ok(record) if !record.token.is_empty() => Some(record),
            Ok(_) => {
                log::warn!("session file incomplete, removing");
                self.clear().await.ok();
                None
            }
            Err(e) => {
                log::warn!("session file corrupt ({e}), removing");
                self.clear().await.ok();
                None
            }
        }
    }

    /// Delete the persisted session, if any
    pub async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
            log::info!("session cleared");
        }
        Ok(())
    }

    /// Path of the session file (for tests and diagnostics)
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        store.save(7, "some-token").await.unwrap();

        let record = store.load().await.unwrap();
        assert_eq!(record.user_id, 7);
        assert_eq!(record.token, "some-token");
        // saved_at parses as RFC 3339
        assert!(chrono::DateTime::parse_from_rfc3339(&record.saved_at).is_ok());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        store.save(1, "first").await.unwrap();
        store.save(2, "second").await.unwrap();

        let record = store.load().await.unwrap();
        assert_eq!(record.user_id, 2);
        assert_eq!(record.token, "second");
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_session_self_heals() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        std::fs::write(store.path(), b"{ not json").unwrap();

        assert!(store.load().await.is_none());
        assert!(!store.path().exists(), "corrupt session file should be deleted");
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());

        store.save(1, "token").await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.path().exists());
        // Clearing again is a no-op
        store.clear().await.unwrap();
    }
}
