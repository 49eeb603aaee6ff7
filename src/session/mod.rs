//! Session issuance: signed, time-limited bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id, email, and a snapshot of the
//! role set at login. They are holder-owned: there is no server-side
//! revocation list, expiry is purely time-based, and the account status is
//! re-read from the credential store on every guarded request rather than
//! trusted from the token.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Claims embedded in every session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (UUID string).
    pub sub: String,
    pub email: String,
    /// Role tags held at login.
    pub roles: Vec<String>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// Mints and verifies session tokens with a shared HS256 secret.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for a fully authenticated user.
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails (malformed key material).
    pub fn mint(&self, user_id: Uuid, email: &str, roles: &[String]) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            iat: now,
            exp: now + self.ttl_seconds,
            jti: Uuid::new_v4().to_string(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .context("failed to encode session token")
    }

    /// Verify a bearer token. Any failure (bad signature, expired, garbage)
    /// collapses to `SessionInvalid` — the caller's remedy is the same.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| Error::SessionInvalid)
    }
}
