//! Centralized path management for AniPlay
//!
//! This module provides utilities for consistently deriving data directories,
//! database paths, the session file and the image cache directory. Every
//! subsystem accepts an explicit base directory at construction, so these
//! helpers take the base as a parameter and only `default_data_dir` touches
//! platform directories.

use std::path::{Path, PathBuf};

/// The name of the application data directory used across all platforms
const APP_DATA_DIR: &str = "aniplay";

/// The name of the global users database file
const USERS_DB_FILE: &str = "users.db";

/// The name of the persisted session file
const SESSION_FILE: &str = "session.json";

/// Preferred image cache subpath under the data directory
const IMAGE_CACHE_SUBDIR: &str = "cache/images";

/// Fallback image cache directory if the preferred one cannot be created
const IMAGE_CACHE_FALLBACK_SUBDIR: &str = "images_cache";

/// Returns the base data directory for the application
///
/// On Unix-like systems this follows the XDG Base Directory specification
/// (`~/.local/share/aniplay`); on Windows it uses `%APPDATA%/aniplay`.
/// Falls back to `.aniplay` in the current directory if the platform
/// directory cannot be determined.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DATA_DIR))
        .unwrap_or_else(|| PathBuf::from(".aniplay"))
}

/// Returns the path to the global users database
pub fn users_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(USERS_DB_FILE)
}

/// Returns the path to a user's private database
pub fn user_db_path(data_dir: &Path, user_id: i64) -> PathBuf {
    data_dir.join(format!("user_{user_id}.db"))
}

/// Returns the path to the persisted session file
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// Returns the preferred image cache directory
pub fn image_cache_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(IMAGE_CACHE_SUBDIR)
}

/// Returns the fallback image cache directory, used if creating the
/// preferred one fails
pub fn image_cache_fallback_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(IMAGE_CACHE_FALLBACK_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_dir_contains_aniplay() {
        let data_dir = default_data_dir();
        assert!(
            data_dir.to_string_lossy().contains("aniplay"),
            "Data dir should contain 'aniplay': {}",
            data_dir.display()
        );
    }

    #[test]
    fn test_users_db_path_has_correct_filename() {
        let path = users_db_path(Path::new("/data"));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(USERS_DB_FILE)
        );
    }

    #[test]
    fn test_user_db_path_embeds_user_id() {
        let path = user_db_path(Path::new("/data"), 42);
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("user_42.db"));
    }

    #[test]
    fn test_session_path_is_under_data_dir() {
        let base = Path::new("/data");
        let path = session_path(base);
        assert!(path.starts_with(base));
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(SESSION_FILE));
    }

    #[test]
    fn test_image_cache_dirs_are_distinct() {
        let base = Path::new("/data");
        let preferred = image_cache_dir(base);
        let fallback = image_cache_fallback_dir(base);

        assert!(preferred.starts_with(base));
        assert!(fallback.starts_with(base));
        assert_ne!(preferred, fallback);
        assert!(preferred.ends_with("cache/images"));
    }
}
