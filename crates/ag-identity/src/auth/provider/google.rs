//! Google OAuth Provider

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{http_client, OAuthProfile, OAuthProvider, ProviderConfig, ProviderEndpoints, UpstreamToken};
use crate::shared::error::{AuthError, Result};

/// Default Google OAuth endpoints
pub const GOOGLE_ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    user_info_url: "https://openidconnect.googleapis.com/v1/userinfo",
    emails_url: "",
};

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: String,
}

pub struct GoogleProvider {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl GoogleProvider {
    pub fn new(settings: &ag_config::OAuthProviderSettings) -> Self {
        Self {
            http_client: http_client(),
            config: ProviderConfig::from_settings(settings, &GOOGLE_ENDPOINTS),
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        // access_type=offline with prompt=consent makes Google return a
        // refresh token on every authorization
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }

    async fn exchange(&self, code: &str) -> Result<UpstreamToken> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = "google", error = %e, "Token exchange request failed");
                AuthError::internal(format!("google token exchange failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = "google", %status, "Token exchange returned error status");
            return Err(AuthError::internal(format!(
                "google token exchange failed: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            AuthError::internal(format!("Failed to parse google token response: {}", e))
        })
    }

    async fn fetch_profile(&self, token: &UpstreamToken) -> Result<OAuthProfile> {
        let response = self
            .http_client
            .get(&self.config.user_info_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = "google", error = %e, "Userinfo request failed");
                AuthError::internal(format!("google userinfo failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = "google", %status, "Userinfo returned error status");
            return Err(AuthError::internal(format!(
                "google userinfo failed: {}",
                status
            )));
        }

        let payload: GoogleUserInfo = response.json().await.map_err(|e| {
            AuthError::internal(format!("Failed to parse google userinfo: {}", e))
        })?;

        Ok(OAuthProfile {
            provider: self.name().to_string(),
            provider_user_id: payload.sub,
            email: payload.email,
            email_verified: payload.email_verified,
            name: payload.name,
            avatar_url: payload.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> ag_config::OAuthProviderSettings {
        let mut settings = ag_config::OAuthProviderSettings::default();
        settings.client_id = "client-id".to_string();
        settings.client_secret = "client-secret".to_string();
        settings.redirect_url = "https://app.example.com/callback".to_string();
        settings
    }

    #[test]
    fn test_authorization_url() {
        let provider = GoogleProvider::new(&test_settings());
        let url = provider.authorization_url("state-token");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_endpoint_overrides() {
        let mut settings = test_settings();
        settings.auth_url = "https://mock/auth".to_string();

        let provider = GoogleProvider::new(&settings);
        assert!(provider.authorization_url("s").starts_with("https://mock/auth?"));
    }
}
