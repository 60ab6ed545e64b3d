//! Credential & session manager
//!
//! Gatekeeper for all identity operations: registration, login, token
//! verification, session persistence and user lookup. No other component
//! touches the users store or the per-user databases directly.

pub mod password;
pub mod session;
pub mod token;

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::db::{Database, UserDataStore, UserInfo, UserRepository};
use crate::error::{AuthError, Error, Result, ValidationError};

pub use password::{MAX_PASSWORD_BYTES, PasswordScheme, select_scheme};
pub use session::{SessionRecord, SessionStore};
pub use token::{Claims, TokenManager};

/// Minimum accepted password length, in characters
const MIN_PASSWORD_CHARS: usize = 6;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

/// Explicit construction-time configuration for [`AuthSystem`]
///
/// The token secret lives here rather than in a process-wide global; the
/// caller decides where it comes from (config file, environment).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base directory for the users database, per-user databases and the
    /// session file
    pub data_dir: PathBuf,
    /// Secret used to sign and verify session tokens
    pub token_secret: String,
    /// Token lifetime in days
    pub token_ttl_days: i64,
}

impl AuthConfig {
    /// Configuration with the 7-day reference token lifetime
    pub fn new(data_dir: PathBuf, token_secret: impl Into<String>) -> Self {
        Self {
            data_dir,
            token_secret: token_secret.into(),
            token_ttl_days: 7,
        }
    }
}

/// The credential & session manager
pub struct AuthSystem {
    data_dir: PathBuf,
    db: Database,
    tokens: TokenManager,
    scheme: Box<dyn PasswordScheme>,
    sessions: SessionStore,
}

impl AuthSystem {
    /// Open (creating if missing) the users database and build the manager
    ///
    /// The password scheme is selected once here and reused for every
    /// hash/verify call.
    pub async fn new(config: AuthConfig) -> Result<Self> {
        let db = Database::open(&crate::paths::users_db_path(&config.data_dir)).await?;
        let scheme = select_scheme();
        log::info!("auth system initialized with {} hashing", scheme.name());

        Ok(Self {
            tokens: TokenManager::new(config.token_secret.as_bytes(), config.token_ttl_days),
            sessions: SessionStore::new(&config.data_dir),
            scheme,
            db,
            data_dir: config.data_dir,
        })
    }

    /// Register a new user
    ///
    /// Validation runs in order: username, email, password length; the
    /// first violated rule wins. On success the password is hashed, the
    /// user row inserted and the user's private database created with
    /// default preferences. The two writes are not atomic across files: if
    /// private-database creation fails the user row still exists; this is
    /// an accepted limitation and is logged rather than surfaced.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<String> {
        if !username_pattern().is_match(username) {
            return Err(ValidationError::InvalidUsername.into());
        }
        if !email_pattern().is_match(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ValidationError::password_too_short(MIN_PASSWORD_CHARS).into());
        }

        let users = UserRepository::new(self.db.pool().clone());
        if users.username_or_email_exists(username, email).await? {
            return Err(Error::conflict("username or email"));
        }

        let password_hash = self.scheme.hash(password)?;
        let user_id = users.insert(username, email, &password_hash).await?;

        if let Err(e) = UserDataStore::create(&self.data_dir, user_id).await {
            log::error!("failed to create private database for user {user_id}: {e}");
        }

        log::info!("new user registered: {username} (id {user_id})");
        Ok("User registered successfully".to_string())
    }

    /// Log a user in, returning a signed session token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let users = UserRepository::new(self.db.pool().clone());

        let user = users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::not_found("user"))?;

        if !self.scheme.verify(password, &user.password_hash)? {
            return Err(AuthError::WrongPassword.into());
        }

        let token = self.tokens.issue(user.id, &user.username)?;
        log::info!("login succeeded: {username}");
        Ok(token)
    }

    /// Verify a session token, returning its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token)
    }

    /// Persist a session for auto-login
    pub async fn save_session(&self, user_id: i64, token: &str) -> Result<()> {
        self.sessions.save(user_id, token).await
    }

    /// Load the persisted session, if it is still valid
    ///
    /// The embedded token is re-verified; an expired or invalid session is
    /// proactively deleted and reported absent.
    pub async fn load_session(&self) -> Option<Claims> {
        let record = self.sessions.load().await?;

        match self.tokens.verify(&record.token) {
            Ok(claims) => {
                log::info!("session restored for {}", claims.username);
                Some(claims)
            }
            Err(e) => {
                log::warn!("persisted session no longer valid ({e}), removing");
                self.sessions.clear().await.ok();
                None
            }
        }
    }

    /// Delete the persisted session, if any
    pub async fn clear_session(&self) -> Result<()> {
        self.sessions.clear().await
    }

    /// Look up public user info by id
    ///
    /// Storage failures are logged and reported as absence; this call is
    /// used by UI code that has no use for error detail.
    pub async fn get_user_info(&self, user_id: i64) -> Option<UserInfo> {
        let users = UserRepository::new(self.db.pool().clone());

        match users.find_by_id(user_id).await {
            Ok(user) => user.map(|u| u.info()),
            Err(e) => {
                log::error!("user lookup failed: {e}");
                None
            }
        }
    }

    /// The persisted token of the current session, if any (without
    /// re-verification; used by logout-style flows)
    pub async fn current_session(&self) -> Option<SessionRecord> {
        self.sessions.load().await
    }
}
