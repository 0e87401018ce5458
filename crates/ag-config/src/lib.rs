//! AuthGate Configuration System
//!
//! This crate provides TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthGateConfig {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub oauth: OAuthConfig,

    /// Promote the very first registered user to the admin role
    pub allow_first_admin: bool,

    /// Reject OAuth logins whose provider email is unverified
    pub require_verified_email: bool,
}

impl Default for AuthGateConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password: PasswordConfig::default(),
            oauth: OAuthConfig::default(),
            allow_first_admin: true,
            require_verified_email: false,
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

impl Default for JwtConfig {
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

/// Password policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 12,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// OAuth provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google: OAuthProviderSettings,
    pub github: OAuthProviderSettings,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google: OAuthProviderSettings::default(),
            github: OAuthProviderSettings::default(),
        }
    }
}

/// Settings for a single OAuth provider
///
/// A provider is configured when client id, secret, and redirect URL are
/// all non-empty. Endpoint URLs are optional overrides; each provider
/// ships its own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub emails_url: String,
}

impl Default for OAuthProviderSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: String::new(),
            auth_url: String::new(),
            token_url: String::new(),
            user_info_url: String::new(),
            emails_url: String::new(),
        }
    }
}

impl OAuthProviderSettings {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.redirect_url.is_empty()
    }
}

impl AuthGateConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AuthGateConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Validate settings that have no sensible fallback
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "jwt.secret must be set".to_string(),
            ));
        }
        if self.jwt.access_token_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "jwt.access_token_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.jwt.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "jwt.refresh_token_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.password.min_length > self.password.max_length {
            return Err(ConfigError::ValidationError(format!(
                "password.min_length ({}) exceeds password.max_length ({})",
                self.password.min_length, self.password.max_length
            )));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# AuthGate Configuration
# Environment variables override these settings

allow_first_admin = true
require_verified_email = false

[jwt]
secret = ""
issuer = "authgate"
audience = "authgate-clients"
access_token_ttl_secs = 900
refresh_token_ttl_secs = 604800

[password]
min_length = 12
max_length = 128
require_uppercase = true
require_lowercase = true
require_digit = true
require_special = true

[oauth.google]
client_id = ""
client_secret = ""
redirect_url = ""
# Endpoint overrides (defaults used when empty)
auth_url = ""
token_url = ""
user_info_url = ""

[oauth.github]
client_id = ""
client_secret = ""
redirect_url = ""
auth_url = ""
token_url = ""
user_info_url = ""
emails_url = ""
"#
        .to_string()
    }
}
