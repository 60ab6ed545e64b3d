//! Password hashing strategies
//!
//! Hashing is abstracted behind [`PasswordScheme`] and the scheme is
//! selected once at startup via [`select_scheme`], not re-selected per
//! call. Argon2id is the production scheme.
//!
//! Inputs longer than [`MAX_PASSWORD_BYTES`] are silently truncated before
//! hashing and verification. This is an intentional, documented limitation
//! carried over from the reference behavior (a bcrypt-era constraint), not
//! a bug: hash and verify truncate identically, so round-trips stay
//! consistent.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::{AuthError, Result};

/// Maximum number of password bytes fed to the hasher
pub const MAX_PASSWORD_BYTES: usize = 72;

/// A pluggable password hashing strategy
pub trait PasswordScheme: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Hash a password, producing a self-describing hash string
    fn hash(&self, password: &str) -> Result<String>;

    /// Verify a password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Select the password scheme for this process
///
/// Argon2id is pure Rust and always available, so unlike the reference
/// implementation there is no runtime fallback chain; the trait keeps the
/// seam open for platform-specific schemes.
pub fn select_scheme() -> Box<dyn PasswordScheme> {
    Box::new(Argon2Scheme)
}

/// Argon2id password hashing with per-hash random salts
pub struct Argon2Scheme;

impl PasswordScheme for Argon2Scheme {
    fn name(&self) -> &'static str {
        "argon2id"
    }

    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(truncate_secret(password), &salt)
            .map_err(|e| AuthError::hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::hashing(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(truncate_secret(password), &parsed)
            .is_ok())
    }
}

/// Truncate a password to the maximum hashable length
fn truncate_secret(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    if bytes.len() > MAX_PASSWORD_BYTES {
        log::warn!("password longer than {MAX_PASSWORD_BYTES} bytes, truncating before hashing");
        &bytes[..MAX_PASSWORD_BYTES]
    } else {
        bytes
    }
}
