//! Per-user private database
//!
//! Each registered user gets a private SQLite file (`user_{id}.db`) holding
//! their preferences plus favorites and watch-history tables. The database
//! is created lazily at registration with default preferences; the
//! connection is opened per operation and dropped afterwards.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Result;
use crate::paths;

use super::schema::USER_DB_SCHEMA;

/// A user's stored preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub user_id: i64,
    pub theme: String,
    pub language: String,
    pub auto_play: bool,
    pub default_quality: String,
}

/// Accessor for per-user private databases
pub struct UserDataStore;

impl UserDataStore {
    /// Create a user's private database with default preferences
    ///
    /// Idempotent: existing tables and an existing preferences row are
    /// left untouched.
    pub async fn create(data_dir: &Path, user_id: i64) -> Result<PathBuf> {
        let db_path = paths::user_db_path(data_dir, user_id);
        let pool = Self::connect(&db_path).await?;

        sqlx::raw_sql(USER_DB_SCHEMA).execute(&pool).await?;

        sqlx::query("INSERT OR IGNORE INTO preferences (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&pool)
            .await?;

        pool.close().await;
        log::info!("created private database for user {user_id}");

        Ok(db_path)
    }

    /// Load a user's preferences
    pub async fn preferences(data_dir: &Path, user_id: i64) -> Result<Option<Preferences>> {
        let db_path = paths::user_db_path(data_dir, user_id);
        if !db_path.exists() {
            return Ok(None);
        }

        let pool = Self::connect(&db_path).await?;

        let row = sqlx::query(
            r#"
            SELECT user_id, theme, language, auto_play, default_quality
            FROM preferences
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

        let prefs = row
            .map(|row| -> Result<Preferences> {
                Ok(Preferences {
                    user_id: row.try_get("user_id")?,
                    theme: row.try_get("theme")?,
                    language: row.try_get("language")?,
                    auto_play: row.try_get::<i64, _>("auto_play")? != 0,
                    default_quality: row.try_get("default_quality")?,
                })
            })
            .transpose()?;

        pool.close().await;
        Ok(prefs)
    }

    async fn connect(db_path: &Path) -> Result<SqlitePool> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
                .create_if_missing(true)
                .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_writes_default_preferences() {
        let temp_dir = TempDir::new().unwrap();

        let db_path = UserDataStore::create(temp_dir.path(), 7).await.unwrap();
        assert!(db_path.exists());

        let prefs = UserDataStore::preferences(temp_dir.path(), 7)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.language, "pt-BR");
        assert!(prefs.auto_play);
        assert_eq!(prefs.default_quality, "1080p");
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();

        UserDataStore::create(temp_dir.path(), 7).await.unwrap();
        UserDataStore::create(temp_dir.path(), 7).await.unwrap();

        let prefs = UserDataStore::preferences(temp_dir.path(), 7)
            .await
            .unwrap();
        assert!(prefs.is_some());
    }

    #[tokio::test]
    async fn test_preferences_for_unknown_user_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let prefs = UserDataStore::preferences(temp_dir.path(), 99)
            .await
            .unwrap();
        assert!(prefs.is_none());
    }
}
