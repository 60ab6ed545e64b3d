//! SQLite storage for the credential & session manager
//!
//! One global users database plus one private database per user. The users
//! database is held open through a small connection pool; each operation
//! acquires its own connection, preserving per-operation isolation.

pub mod migrations;
pub mod profile;
pub mod schema;
pub mod users;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;

pub use profile::{Preferences, UserDataStore};
pub use users::{User, UserInfo, UserRepository};

/// Users database connection manager
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the users database and run migrations
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        let db = Self { pool };
        migrations::run_migrations(&db.pool).await?;

        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of registered users
    pub async fn user_count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("users.db");

        let db = Database::open(&db_path).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(db.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/dir/users.db");

        Database::open(&db_path).await.unwrap();
        assert!(db_path.exists());
    }
}
