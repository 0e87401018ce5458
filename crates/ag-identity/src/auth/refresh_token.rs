//! Refresh Token Entity
//!
//! Stores refresh tokens for session renewal.
//! Refresh tokens are long-lived and can be used to obtain new access tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default refresh token expiry: 7 days
const REFRESH_TOKEN_EXPIRY_HOURS: i64 = 168;

/// Revocation state of a refresh token
///
/// Expiry is a separate, time-based check. A token can be both expired
/// and revoked; revocation is the only state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenState {
    Active,
    Revoked { revoked_at: DateTime<Utc> },
}

/// Refresh token entity
///
/// Stored to enable:
/// 1. Token validation and exchange for new access tokens
/// 2. Token revocation (logout, security events)
/// 3. Token rotation (issue new refresh token on use)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    pub id: Uuid,

    /// SHA-256 digest of the raw token (base64url, no padding)
    /// Only the hash is stored; the raw token is returned to the client once
    pub token_hash: String,

    pub user_id: Uuid,

    #[serde(default = "default_state")]
    pub state: TokenState,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn default_state() -> TokenState {
    TokenState::Active
}

impl RefreshToken {
    /// Create a new refresh token
    ///
    /// Note: The raw token should be generated separately and hashed before storage.
    /// Use `generate_token_pair()` to create both the raw token and entity.
    pub fn new(token_hash: impl Into<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            token_hash: token_hash.into(),
            user_id,
            state: TokenState::Active,
            created_at: now,
            expires_at: now + Duration::hours(REFRESH_TOKEN_EXPIRY_HOURS),
        }
    }

    /// Create with custom expiry duration
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expires_at = self.created_at + expiry;
        self
    }

    /// Check if the token is valid (not expired and not revoked)
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && Utc::now() < self.expires_at
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the token has been revoked
    pub fn is_revoked(&self) -> bool {
        matches!(self.state, TokenState::Revoked { .. })
    }

    /// Revoke the token
    pub fn revoke(&mut self) {
        if !self.is_revoked() {
            self.state = TokenState::Revoked {
                revoked_at: Utc::now(),
            };
        }
    }

    /// Generate a cryptographically random token string
    pub fn generate_raw_token() -> String {
        use base64::Engine;
        use rand::Rng;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hash a raw token for storage
    pub fn hash_token(raw_token: &str) -> String {
        use base64::Engine;
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(raw_token.as_bytes());
        let hash = hasher.finalize();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
    }

    /// Generate a token pair (raw token for client, entity for storage)
    pub fn generate_token_pair(user_id: Uuid) -> (String, Self) {
        let raw_token = Self::generate_raw_token();
        let token_hash = Self::hash_token(&raw_token);
        let entity = Self::new(token_hash, user_id);
        (raw_token, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token() {
        let user_id = Uuid::new_v4();
        let (raw, token) = RefreshToken::generate_token_pair(user_id);

        assert!(!raw.is_empty());
        assert_eq!(token.user_id, user_id);
        assert_eq!(token.state, TokenState::Active);
        assert!(token.is_valid());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_hashing() {
        let raw = RefreshToken::generate_raw_token();
        let hash1 = RefreshToken::hash_token(&raw);
        let hash2 = RefreshToken::hash_token(&raw);

        // Same input produces same hash
        assert_eq!(hash1, hash2);

        // Different input produces different hash
        let raw2 = RefreshToken::generate_raw_token();
        let hash3 = RefreshToken::hash_token(&raw2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_revoke_token() {
        let (_, mut token) = RefreshToken::generate_token_pair(Uuid::new_v4());
        assert!(token.is_valid());

        token.revoke();
        assert!(!token.is_valid());
        assert!(token.is_revoked());

        // Revoking again keeps the original timestamp
        let first = token.state.clone();
        token.revoke();
        assert_eq!(token.state, first);
    }

    #[test]
    fn test_expired_token_can_still_be_active() {
        let (_, token) = RefreshToken::generate_token_pair(Uuid::new_v4());
        let token = token.with_expiry(Duration::hours(-1));

        assert!(token.is_expired());
        assert!(!token.is_revoked());
        assert!(!token.is_valid());
    }
}
