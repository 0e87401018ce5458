//! GitHub OAuth Provider

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{http_client, OAuthProfile, OAuthProvider, ProviderConfig, ProviderEndpoints, UpstreamToken};
use crate::shared::error::{AuthError, Result};

/// Default GitHub OAuth endpoints
pub const GITHUB_ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    auth_url: "https://github.com/login/oauth/authorize",
    token_url: "https://github.com/login/oauth/access_token",
    user_info_url: "https://api.github.com/user",
    emails_url: "https://api.github.com/user/emails",
};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    login: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

pub struct GitHubProvider {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl GitHubProvider {
    pub fn new(settings: &ag_config::OAuthProviderSettings) -> Self {
        Self {
            http_client: http_client(),
            config: ProviderConfig::from_settings(settings, &GITHUB_ENDPOINTS),
        }
    }

    /// Resolve the primary email via the emails endpoint.
    ///
    /// A failing emails call degrades to the basic profile email when one
    /// exists; it is only fatal when the basic profile has no email either.
    async fn primary_email(
        &self,
        token: &UpstreamToken,
        basic_email: &Option<String>,
    ) -> Result<Option<(String, bool)>> {
        let response = match self
            .http_client
            .get(&self.config.emails_url)
            .bearer_auth(&token.access_token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = "github", error = %e, "Emails request failed");
                if basic_email.is_none() {
                    return Err(AuthError::internal(format!("github emails failed: {}", e)));
                }
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = "github", %status, "Emails returned error status");
            if basic_email.is_none() {
                return Err(AuthError::internal(format!(
                    "github emails failed: {}",
                    status
                )));
            }
            return Ok(None);
        }

        let emails: Vec<GitHubEmail> = response.json().await.map_err(|e| {
            AuthError::internal(format!("Failed to parse github emails: {}", e))
        })?;

        Ok(emails
            .into_iter()
            .find(|e| e.primary)
            .map(|e| (e.email, e.verified)))
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode("read:user user:email"),
            urlencoding::encode(state),
        )
    }

    async fn exchange(&self, code: &str) -> Result<UpstreamToken> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("code", code),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(provider = "github", error = %e, "Token exchange request failed");
                AuthError::internal(format!("github token exchange failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = "github", %status, "Token exchange returned error status");
            return Err(AuthError::internal(format!(
                "github token exchange failed: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            AuthError::internal(format!("Failed to parse github token response: {}", e))
        })
    }

    async fn fetch_profile(&self, token: &UpstreamToken) -> Result<OAuthProfile> {
        let response = self
            .http_client
            .get(&self.config.user_info_url)
            .bearer_auth(&token.access_token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = "github", error = %e, "Userinfo request failed");
                AuthError::internal(format!("github userinfo failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = "github", %status, "Userinfo returned error status");
            return Err(AuthError::internal(format!(
                "github userinfo failed: {}",
                status
            )));
        }

        let user: GitHubUser = response.json().await.map_err(|e| {
            AuthError::internal(format!("Failed to parse github userinfo: {}", e))
        })?;

        let basic_email = user.email.filter(|e| !e.is_empty());

        let (mut email, mut verified) = (String::new(), false);
        if let Some((primary, primary_verified)) = self.primary_email(token, &basic_email).await? {
            email = primary;
            verified = primary_verified;
        }

        // Verified status only ever comes from the primary emails entry
        if email.is_empty() {
            email = basic_email.unwrap_or_default();
        }

        let name = match user.name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => user.login,
        };

        Ok(OAuthProfile {
            provider: self.name().to_string(),
            provider_user_id: user.id.to_string(),
            email,
            email_verified: verified,
            name,
            avatar_url: user.avatar_url,
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
        let provider = GitHubProvider::new(&test_settings());
        let url = provider.authorization_url("state-token");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=read%3Auser%20user%3Aemail"));
        assert!(url.contains("state=state-token"));
        assert!(!url.contains("access_type"));
    }
}
