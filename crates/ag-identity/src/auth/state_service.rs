//! OAuth State Service
//!
//! Short-lived signed state tokens carried through the OAuth redirect
//! round-trip. The state binds the callback to the provider that started
//! the flow and optionally carries a post-login redirect target.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::error::{AuthError, Result};

/// State token lifetime: 5 minutes
const STATE_TTL_SECS: i64 = 300;

const STATE_SUBJECT: &str = "oauth-state";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OAuthStateClaims {
    sub: String,
    iss: String,
    exp: i64,
    iat: i64,
    provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

/// Parsed contents of a valid state token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub provider: String,
    pub redirect: Option<String>,
}

/// Mints and parses OAuth state tokens
pub struct StateService {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl StateService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint a state token for the given provider
    pub fn mint(&self, provider: &str, redirect: Option<String>) -> Result<String> {
        let now = Utc::now();
        let claims = OAuthStateClaims {
            sub: STATE_SUBJECT.to_string(),
            iss: self.issuer.clone(),
            exp: (now + Duration::seconds(STATE_TTL_SECS)).timestamp(),
            iat: now.timestamp(),
            provider: provider.to_string(),
            redirect,
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(|e| AuthError::Internal {
            message: format!("Failed to encode state token: {}", e),
        })
    }

    /// Parse and validate a state token
    ///
    /// Any failure (bad signature, expiry, wrong subject, empty provider)
    /// maps to `OAuthStateInvalid`; callers never learn which check failed.
    pub fn parse(&self, state: &str) -> Result<OAuthState> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<OAuthStateClaims>(state, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::OAuthStateInvalid)?;

        if claims.sub != STATE_SUBJECT || claims.provider.is_empty() {
            return Err(AuthError::OAuthStateInvalid);
        }

        Ok(OAuthState {
            provider: claims.provider,
            redirect: claims.redirect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> StateService {
        StateService::new("state-secret", "authgate")
    }

    #[test]
    fn test_mint_and_parse() {
        let service = test_service();

        let state = service
            .mint("google", Some("/dashboard".to_string()))
            .unwrap();
        let parsed = service.parse(&state).unwrap();

        assert_eq!(parsed.provider, "google");
        assert_eq!(parsed.redirect, Some("/dashboard".to_string()));
    }

    #[test]
    fn test_redirect_is_optional() {
        let service = test_service();

        let state = service.mint("github", None).unwrap();
        let parsed = service.parse(&state).unwrap();

        assert_eq!(parsed.provider, "github");
        assert_eq!(parsed.redirect, None);
    }

    #[test]
    fn test_garbage_state_rejected() {
        let service = test_service();
        assert!(matches!(
            service.parse("not-a-jwt"),
            Err(AuthError::OAuthStateInvalid)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = test_service();
        let state = service.mint("google", None).unwrap();

        let other = StateService::new("other-secret", "authgate");
        assert!(matches!(
            other.parse(&state),
            Err(AuthError::OAuthStateInvalid)
        ));
    }

    #[test]
    fn test_empty_provider_rejected() {
        let service = test_service();
        let state = service.mint("", None).unwrap();
        assert!(matches!(
            service.parse(&state),
            Err(AuthError::OAuthStateInvalid)
        ));
    }
}
