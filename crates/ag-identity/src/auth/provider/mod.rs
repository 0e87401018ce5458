//! OAuth Providers
//!
//! Upstream identity providers used for login and account linking.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::shared::error::Result;

mod github;
mod google;

pub use github::GitHubProvider;
pub use google::GoogleProvider;

/// Token returned by a provider's code exchange
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl UpstreamToken {
    /// Convert the relative `expires_in` to an absolute expiry.
    ///
    /// Zero or negative lifetimes yield `None`; some providers omit the
    /// field entirely or send 0 for non-expiring tokens.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.expires_in {
            Some(secs) if secs > 0 => Some(now + Duration::seconds(secs)),
            _ => None,
        }
    }
}

/// Normalized profile returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider: String,
    pub provider_user_id: String,
    pub email: String,
    pub email_verified: bool,
    pub name: String,
    pub avatar_url: String,
}

/// Resolved provider endpoints and credentials
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub emails_url: String,
}

impl ProviderConfig {
    /// Build from settings, filling empty endpoint fields with defaults
    pub fn from_settings(
        settings: &ag_config::OAuthProviderSettings,
        defaults: &ProviderEndpoints,
    ) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_url: settings.redirect_url.clone(),
            auth_url: default_if_empty(&settings.auth_url, defaults.auth_url),
            token_url: default_if_empty(&settings.token_url, defaults.token_url),
            user_info_url: default_if_empty(&settings.user_info_url, defaults.user_info_url),
            emails_url: default_if_empty(&settings.emails_url, defaults.emails_url),
        }
    }
}

/// Default endpoint set shipped by each provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderEndpoints {
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub user_info_url: &'static str,
    pub emails_url: &'static str,
}

fn default_if_empty(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// An upstream OAuth identity provider
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Provider name (lowercase)
    fn name(&self) -> &str;

    /// Build the authorization redirect URL for the given state token
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an upstream token
    async fn exchange(&self, code: &str) -> Result<UpstreamToken>;

    /// Fetch the normalized user profile for an upstream token
    async fn fetch_profile(&self, token: &UpstreamToken) -> Result<OAuthProfile>;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent("authgate")
        .build()
        .expect("Failed to create HTTP client")
}
