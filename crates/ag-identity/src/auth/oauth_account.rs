//! OAuth Account Entity
//!
//! Links a local user to an upstream provider identity.
//! The pair (provider, provider_user_id) is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthAccount {
    pub id: Uuid,

    pub user_id: Uuid,

    /// Provider name (lowercase, e.g. "google", "github")
    pub provider: String,

    /// Subject identifier issued by the provider
    pub provider_user_id: String,

    /// Most recent upstream access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Upstream refresh token (when the provider issues one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Upstream access token expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthAccount {
    pub fn new(
        user_id: Uuid,
        provider: impl Into<String>,
        provider_user_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider: provider.into(),
            provider_user_id: provider_user_id.into(),
            access_token: None,
            refresh_token: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tokens(
        mut self,
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.access_token = access_token;
        self.refresh_token = refresh_token;
        self.expires_at = expires_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let user_id = Uuid::new_v4();
        let account = OAuthAccount::new(user_id, "github", "12345");

        assert_eq!(account.user_id, user_id);
        assert_eq!(account.provider, "github");
        assert_eq!(account.provider_user_id, "12345");
        assert!(account.access_token.is_none());
    }

    #[test]
    fn test_with_tokens() {
        let account = OAuthAccount::new(Uuid::new_v4(), "google", "sub-1").with_tokens(
            Some("at".to_string()),
            Some("rt".to_string()),
            Some(Utc::now()),
        );

        assert_eq!(account.access_token.as_deref(), Some("at"));
        assert_eq!(account.refresh_token.as_deref(), Some("rt"));
        assert!(account.expires_at.is_some());
    }
}
