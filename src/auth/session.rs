//! Session tokens for StudySync.
//!
//! A successful login is bound to the user through a signed HS256 token that
//! the web layer stores in a cookie.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::context::Identity;
use crate::db::User;
use crate::{Result, StudySyncError};

/// Claims stored in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Account email.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Identity {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl SessionManager {
    /// Create a manager from a signing secret and session lifetime.
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Session lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| StudySyncError::Auth(format!("failed to sign session: {e}")))
    }

    /// Verify a token and return the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| StudySyncError::Auth(format!("invalid session: {e}")))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
