//! Signed session token verification.
//!
//! Token format: `<userId>.<expiresAtUnix>.<signature>` where the signature is
//! `hex(sha256(secret "." userId "." expiresAtUnix))`. User ids may contain
//! dots, so the token is split from the right.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use questarena_domain::{UserId, AI_IDENTITY};

use crate::infrastructure::ports::{AuthError, ClockPort, TokenVerifier};

/// Verifies tokens signed with a shared secret.
pub struct SignedTokenVerifier {
    secret: String,
    clock: Arc<dyn ClockPort>,
}

impl SignedTokenVerifier {
    pub fn new(secret: impl Into<String>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    fn sign(&self, user_id: &str, expires_at: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b".");
        hasher.update(user_id.as_bytes());
        hasher.update(b".");
        hasher.update(expires_at.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Issue a token for `user_id`. Used by development tooling and tests;
    /// production tokens come from the identity provider.
    pub fn issue(&self, user_id: &UserId, expires_at: DateTime<Utc>) -> String {
        let expires = expires_at.timestamp();
        format!("{}.{}.{}", user_id, expires, self.sign(user_id.as_str(), expires))
    }
}

impl TokenVerifier for SignedTokenVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let mut parts = token.trim().rsplitn(3, '.');
        let signature = parts.next().ok_or(AuthError::Malformed)?;
        let expires = parts.next().ok_or(AuthError::Malformed)?;
        let user_id = parts.next().ok_or(AuthError::Malformed)?;

        if user_id.is_empty() {
            return Err(AuthError::Malformed);
        }
        let expires_at: i64 = expires.parse().map_err(|_| AuthError::Malformed)?;

        let expected = self.sign(user_id, expires_at);
        if !constant_time_eq(expected.as_bytes(), signature.to_ascii_lowercase().as_bytes()) {
            return Err(AuthError::BadSignature);
        }
        if self.clock.now().timestamp() >= expires_at {
            return Err(AuthError::Expired);
        }
        if user_id == AI_IDENTITY {
            return Err(AuthError::ReservedIdentity);
        }

        Ok(UserId::new(user_id))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
