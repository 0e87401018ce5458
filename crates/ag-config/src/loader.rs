//! Configuration loader with file and environment variable support

use crate::{AuthGateConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "application.toml",
    "authgate.toml",
    "./config/config.toml",
    "./config/application.toml",
    "/etc/authgate/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AuthGateConfig, ConfigError> {
        // Start with defaults
        let mut config = AuthGateConfig::default();

        // Try to load from file
        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AuthGateConfig::from_file(&path)?;
        }

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        // Check AUTHGATE_CONFIG env var
        if let Ok(path) = env::var("AUTHGATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AuthGateConfig) {
        // JWT
        if let Ok(val) = env::var("AUTHGATE_JWT_SECRET") {
            config.jwt.secret = val;
        }
        if let Ok(val) = env::var("AUTHGATE_JWT_ISSUER") {
            config.jwt.issuer = val;
        }
        if let Ok(val) = env::var("AUTHGATE_JWT_AUDIENCE") {
            config.jwt.audience = val;
        }
        if let Ok(val) = env::var("AUTHGATE_ACCESS_TOKEN_TTL_SECS") {
            if let Ok(ttl) = val.parse() {
                config.jwt.access_token_ttl_secs = ttl;
            }
        }
        if let Ok(val) = env::var("AUTHGATE_REFRESH_TOKEN_TTL_SECS") {
            if let Ok(ttl) = val.parse() {
                config.jwt.refresh_token_ttl_secs = ttl;
            }
        }

        // Password policy
        if let Ok(val) = env::var("AUTHGATE_PASSWORD_MIN_LENGTH") {
            if let Ok(len) = val.parse() {
                config.password.min_length = len;
            }
        }
        if let Ok(val) = env::var("AUTHGATE_PASSWORD_MAX_LENGTH") {
            if let Ok(len) = val.parse() {
                config.password.max_length = len;
            }
        }

        // OAuth - Google
        if let Ok(val) = env::var("AUTHGATE_GOOGLE_CLIENT_ID") {
            config.oauth.google.client_id = val;
        }
        if let Ok(val) = env::var("AUTHGATE_GOOGLE_CLIENT_SECRET") {
            config.oauth.google.client_secret = val;
        }
        if let Ok(val) = env::var("AUTHGATE_GOOGLE_REDIRECT_URL") {
            config.oauth.google.redirect_url = val;
        }

        // OAuth - GitHub
        if let Ok(val) = env::var("AUTHGATE_GITHUB_CLIENT_ID") {
            config.oauth.github.client_id = val;
        }
        if let Ok(val) = env::var("AUTHGATE_GITHUB_CLIENT_SECRET") {
            config.oauth.github.client_secret = val;
        }
        if let Ok(val) = env::var("AUTHGATE_GITHUB_REDIRECT_URL") {
            config.oauth.github.redirect_url = val;
        }

        // General
        if let Ok(val) = env::var("AUTHGATE_ALLOW_FIRST_ADMIN") {
            config.allow_first_admin = val.parse().unwrap_or(true);
        }
        if let Ok(val) = env::var("AUTHGATE_REQUIRE_VERIFIED_EMAIL") {
            config.require_verified_email = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
