//! Signed token issuance and verification
//!
//! Tokens are stateless HS256 JWTs carrying the user id, username and
//! expiry. Verification is a pure function of the token and the secret;
//! expired and tampered tokens fail with distinguishable errors.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Decoded payload of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id
    pub user_id: i64,
    /// Username at issuance time
    pub username: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Issues and verifies session tokens for a single secret
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenManager {
    /// Create a manager with the given secret and lifetime in days
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self::with_ttl_secs(secret, ttl_days * 86_400)
    }

    /// Create a manager with an explicit lifetime in seconds
    ///
    /// A zero or negative lifetime produces already-expired tokens, which
    /// the tests use to exercise the expiry path without waiting.
    pub fn with_ttl_secs(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a signed token for the given user
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let now = now_secs();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token and return its claims
    ///
    /// Fails with `AuthError::TokenExpired` at or after the expiry instant
    /// and `AuthError::TokenInvalid` for anything tampered or malformed.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)?;

        // The decoder only rejects exp strictly in the past; a token with
        // exp = T must already be rejected at T, so check the boundary here
        if data.claims.exp <= now_secs() {
            return Err(crate::error::AuthError::TokenExpired.into());
        }

        Ok(data.claims)
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
