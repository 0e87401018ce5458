//! Access Token Service
//!
//! HS256 JWT generation and validation for short-lived access tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{AuthError, Result};
use crate::user::entity::User;

/// JWT Claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// User email
    pub email: String,

    /// Display name
    pub name: String,

    /// Roles assigned to this user
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret key for HS256
    pub secret: String,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Access token expiration in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "authgate".to_string(),
            audience: "authgate-clients".to_string(),
            access_token_ttl_secs: 900,     // 15 minutes
            refresh_token_ttl_secs: 604800, // 7 days
        }
    }
}

impl TokenConfig {
    /// Build from the configuration section
    pub fn from_config(config: &ag_config::JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl_secs: config.access_token_ttl_secs as i64,
            refresh_token_ttl_secs: config.refresh_token_ttl_secs as i64,
        }
    }
}

/// Token service for access token management
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        info!("TokenService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate an access token for a user
    ///
    /// Returns the encoded token along with its expiry time.
    pub fn generate_access_token(&self, user: &User) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_ttl_secs);

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            email: user.email.clone(),
            name: user.name.clone(),
            roles: user.roles.clone(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            AuthError::Internal {
                message: format!("Failed to encode JWT: {}", e),
            }
        })?;

        Ok((token, exp))
    }

    /// Validate an access token and extract claims
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken {
                    message: format!("{}", e),
                },
            })
    }

    /// Refresh token lifetime configured alongside the access token TTL
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.config.refresh_token_ttl_secs)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    if auth_header.starts_with("Bearer ") {
        Some(&auth_header[7..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: "test-secret".to_string(),
            ..TokenConfig::default()
        })
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = test_service();

        let user = User::new("test@example.com", "Test User")
            .with_roles(vec!["admin".to_string()]);
        let (token, exp) = service.generate_access_token(&user).unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.roles, vec!["admin".to_string()]);
        assert_eq!(claims.exp, exp.timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = test_service();
        let user = User::new("test@example.com", "Test User");
        let (token, _) = service.generate_access_token(&user).unwrap();

        let other = TokenService::new(TokenConfig {
            secret: "other-secret".to_string(),
            ..TokenConfig::default()
        });
        assert!(matches!(
            other.validate_access_token(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(TokenConfig {
            secret: "test-secret".to_string(),
            access_token_ttl_secs: -60,
            ..TokenConfig::default()
        });

        let user = User::new("test@example.com", "Test User");
        let (token, _) = service.generate_access_token(&user).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = test_service();
        let user = User::new("test@example.com", "Test User");
        let (token, _) = service.generate_access_token(&user).unwrap();

        let other = TokenService::new(TokenConfig {
            secret: "test-secret".to_string(),
            issuer: "someone-else".to_string(),
            ..TokenConfig::default()
        });
        assert!(other.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
