//! SQL schema definitions
//!
//! Schema for the global users database (versioned via `schema_version`)
//! and for the per-user private database created lazily at registration.

/// Current schema version of the users database
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Version 1: users table and version bookkeeping
pub const USERS_SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
"#;

/// Per-user private database: preferences row plus favorites and watch
/// history tables. Only the preferences defaults are populated here; the
/// favorites/history tables are schema-only as far as the core goes.
pub const USER_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    user_id INTEGER PRIMARY KEY,
    theme TEXT DEFAULT 'dark',
    language TEXT DEFAULT 'pt-BR',
    auto_play INTEGER DEFAULT 1,
    default_quality TEXT DEFAULT '1080p',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS favorites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    anime_id TEXT NOT NULL,
    anime_title TEXT NOT NULL,
    anime_image TEXT,
    added_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES preferences (user_id),
    UNIQUE(user_id, anime_id)
);

CREATE TABLE IF NOT EXISTS watch_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    anime_id TEXT NOT NULL,
    anime_title TEXT NOT NULL,
    episode_number INTEGER,
    episode_title TEXT,
    progress_seconds INTEGER DEFAULT 0,
    total_seconds INTEGER DEFAULT 0,
    watched_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES preferences (user_id)
);
"#;
