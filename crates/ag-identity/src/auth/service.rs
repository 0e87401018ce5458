//! Auth Orchestrator
//!
//! Ties the token, password, and state services to the stores and the
//! provider registry. Each operation is stateless per call; concurrency
//! correctness is delegated to the stores' uniqueness constraints.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::oauth_account::OAuthAccount;
use crate::auth::password_policy::PasswordPolicy;
use crate::auth::password_service::{Argon2Config, PasswordService};
use crate::auth::provider::{GitHubProvider, GoogleProvider, OAuthProfile, OAuthProvider};
use crate::auth::refresh_token::RefreshToken;
use crate::auth::state_service::StateService;
use crate::auth::token_service::{AccessTokenClaims, TokenConfig, TokenService};
use crate::shared::email::normalize_email;
use crate::shared::error::{AuthError, Result};
use crate::store::{
    InMemoryOAuthAccountStore, InMemoryRefreshTokenStore, InMemoryRoleStore, InMemoryUserStore,
    OAuthAccountStore, RefreshTokenStore, RoleStore, UserStore,
};
use crate::user::entity::User;

const DEFAULT_ROLE: &str = "user";
const ADMIN_ROLE: &str = "admin";

/// Result of a successful authentication
///
/// The only place a refresh token's plaintext leaves the crate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub user: User,
}

/// Store handles consumed by the orchestrator
#[derive(Clone)]
pub struct AuthStores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub oauth_accounts: Arc<dyn OAuthAccountStore>,
}

impl AuthStores {
    /// In-memory stores for tests and single-process deployments
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            roles: Arc::new(InMemoryRoleStore::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenStore::new()),
            oauth_accounts: Arc::new(InMemoryOAuthAccountStore::new()),
        }
    }
}

/// Runtime settings for the orchestrator
#[derive(Clone)]
pub struct AuthServiceConfig {
    pub token: TokenConfig,
    pub argon2: Argon2Config,
    pub policy: PasswordPolicy,
    pub allow_first_admin: bool,
    pub require_verified_email: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            argon2: Argon2Config::default(),
            policy: PasswordPolicy::default(),
            allow_first_admin: true,
            require_verified_email: false,
        }
    }
}

/// Authentication orchestrator
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    oauth_accounts: Arc<dyn OAuthAccountStore>,
    token_service: TokenService,
    state_service: StateService,
    password_service: PasswordService,
    password_policy: PasswordPolicy,
    // Immutable after construction; keyed by lowercase provider name
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
    allow_first_admin: bool,
    require_verified_email: bool,
}

impl AuthService {
    pub fn new(
        config: AuthServiceConfig,
        stores: AuthStores,
        providers: Vec<Arc<dyn OAuthProvider>>,
    ) -> Self {
        let state_service = StateService::new(&config.token.secret, config.token.issuer.as_str());
        let provider_map: HashMap<String, Arc<dyn OAuthProvider>> = providers
            .into_iter()
            .map(|p| (p.name().to_lowercase(), p))
            .collect();

        info!(
            providers = provider_map.len(),
            allow_first_admin = config.allow_first_admin,
            "AuthService initialized"
        );

        Self {
            users: stores.users,
            roles: stores.roles,
            refresh_tokens: stores.refresh_tokens,
            oauth_accounts: stores.oauth_accounts,
            token_service: TokenService::new(config.token),
            state_service,
            password_service: PasswordService::new(config.argon2),
            password_policy: config.policy,
            providers: provider_map,
            allow_first_admin: config.allow_first_admin,
            require_verified_email: config.require_verified_email,
        }
    }

    /// Build from the application configuration
    ///
    /// Registers only the providers whose settings are complete.
    pub fn from_config(config: &ag_config::AuthGateConfig, stores: AuthStores) -> Self {
        let mut providers: Vec<Arc<dyn OAuthProvider>> = Vec::new();
        if config.oauth.google.is_configured() {
            providers.push(Arc::new(GoogleProvider::new(&config.oauth.google)));
        }
        if config.oauth.github.is_configured() {
            providers.push(Arc::new(GitHubProvider::new(&config.oauth.github)));
        }

        let service_config = AuthServiceConfig {
            token: TokenConfig::from_config(&config.jwt),
            argon2: Argon2Config::default(),
            policy: PasswordPolicy::from_config(&config.password),
            allow_first_admin: config.allow_first_admin,
            require_verified_email: config.require_verified_email,
        };

        Self::new(service_config, stores, providers)
    }

    /// Register a new local account
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthResult> {
        let email = normalize_email(email)?;

        if let Err(reasons) = self.password_policy.validate(&email, password) {
            return Err(AuthError::policy_violation(reasons.join("; ")));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = self.password_service.hash_password(password)?;
        let roles = self.roles.ensure_roles(&self.initial_roles().await?).await?;

        let mut user = User::new(email, name.trim()).with_password_hash(password_hash);
        // A concurrent registration of the same email loses here
        self.users.create(&user).await?;
        self.users.add_roles(user.id, &roles).await?;
        user.roles = roles.iter().map(|r| r.name.clone()).collect();

        info!(user_id = %user.id, "Registered user");
        self.issue_tokens(user).await
    }

    /// Authenticate with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult> {
        let email = normalize_email(email)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = match &user.password_hash {
            Some(hash) => hash.clone(),
            None => return Err(AuthError::PasswordLoginDisabled),
        };

        if !self.password_service.verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "Password login succeeded");
        self.issue_tokens(user).await
    }

    /// Exchange a refresh token for a new access/refresh pair
    ///
    /// Strict single-use rotation: the presented token is revoked before a
    /// replacement is issued, and the store's revoke admits one winner.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult> {
        let raw = refresh_token.trim();
        if raw.is_empty() {
            return Err(AuthError::RefreshTokenInvalid);
        }

        let token = self
            .refresh_tokens
            .find_by_hash(&RefreshToken::hash_token(raw))
            .await?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if token.is_revoked() {
            return Err(AuthError::RefreshTokenRevoked);
        }
        if token.is_expired() {
            return Err(AuthError::RefreshTokenExpired);
        }

        // Losing the revoke race means another call already consumed it
        if !self.refresh_tokens.revoke(token.id).await? {
            return Err(AuthError::RefreshTokenRevoked);
        }

        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        debug!(user_id = %user.id, "Rotated refresh token");
        self.issue_tokens(user).await
    }

    /// Revoke the presented refresh token, or every token for its user
    pub async fn logout(&self, refresh_token: &str, revoke_all: bool) -> Result<()> {
        let raw = refresh_token.trim();
        if raw.is_empty() {
            return Err(AuthError::RefreshTokenInvalid);
        }

        let token = self
            .refresh_tokens
            .find_by_hash(&RefreshToken::hash_token(raw))
            .await?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if revoke_all {
            let revoked = self.refresh_tokens.revoke_all_for_user(token.user_id).await?;
            info!(user_id = %token.user_id, count = revoked, "Revoked all refresh tokens");
        } else {
            self.refresh_tokens.revoke(token.id).await?;
        }

        Ok(())
    }

    /// Load the current user with resolved role names
    pub async fn me(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::user_not_found(user_id.to_string()))
    }

    /// Begin an OAuth flow; returns the provider's authorization URL
    pub fn oauth_start(&self, provider_name: &str, redirect: Option<String>) -> Result<String> {
        let provider = self.provider(provider_name)?;
        let state = self.state_service.mint(provider.name(), redirect)?;
        Ok(provider.authorization_url(&state))
    }

    /// Complete an OAuth flow: exchange the code, resolve or create the
    /// local user, and issue tokens
    pub async fn oauth_callback(
        &self,
        provider_name: &str,
        code: &str,
        state: &str,
    ) -> Result<AuthResult> {
        let provider = self.provider(provider_name)?;

        let parsed = self.state_service.parse(state)?;
        if parsed.provider != provider.name() {
            return Err(AuthError::OAuthStateInvalid);
        }

        let token = provider.exchange(code).await?;
        let profile = provider.fetch_profile(&token).await?;

        if profile.email.trim().is_empty() {
            return Err(AuthError::OAuthEmailMissing);
        }
        if self.require_verified_email && !profile.email_verified {
            return Err(AuthError::OAuthEmailNotVerified);
        }

        if let Some(account) = self
            .oauth_accounts
            .find_by_provider_identity(provider.name(), &profile.provider_user_id)
            .await?
        {
            let user = self.users.find_by_id(account.user_id).await?.ok_or_else(|| {
                AuthError::internal(format!("Linked user missing: {}", account.user_id))
            })?;

            // Best-effort: a failure to store upstream tokens never blocks login
            if let Err(e) = self
                .oauth_accounts
                .update_tokens(
                    account.id,
                    Some(token.access_token.clone()),
                    token.refresh_token.clone(),
                    token.expires_at(Utc::now()),
                )
                .await
            {
                warn!(provider = provider.name(), error = %e, "Failed to update upstream tokens");
            }

            return self.issue_tokens(user).await;
        }

        let email = profile.email.trim().to_lowercase();
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => {
                info!(
                    provider = provider.name(),
                    user_id = %user.id,
                    "Linking provider identity to existing user"
                );
                user
            }
            None => self.create_oauth_user(&email, &profile).await?,
        };

        let account = OAuthAccount::new(user.id, provider.name(), profile.provider_user_id.as_str())
            .with_tokens(
                Some(token.access_token.clone()),
                token.refresh_token.clone(),
                token.expires_at(Utc::now()),
            );
        self.oauth_accounts.create(&account).await?;

        self.issue_tokens(user).await
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        self.token_service.validate_access_token(token)
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn OAuthProvider>> {
        let key = name.trim().to_lowercase();
        self.providers
            .get(&key)
            .ok_or(AuthError::OAuthProviderNotConfigured { provider: key })
    }

    async fn initial_roles(&self) -> Result<Vec<String>> {
        let mut names = vec![DEFAULT_ROLE.to_string()];
        if self.allow_first_admin && self.users.count().await? == 0 {
            names.push(ADMIN_ROLE.to_string());
        }
        Ok(names)
    }

    async fn create_oauth_user(&self, email: &str, profile: &OAuthProfile) -> Result<User> {
        let roles = self.roles.ensure_roles(&self.initial_roles().await?).await?;

        let name = match profile.name.trim() {
            "" => email.to_string(),
            trimmed => trimmed.to_string(),
        };

        let mut user = User::new(email, name).with_email_verified(profile.email_verified);
        self.users.create(&user).await?;
        self.users.add_roles(user.id, &roles).await?;
        user.roles = roles.iter().map(|r| r.name.clone()).collect();

        info!(user_id = %user.id, provider = %profile.provider, "Created user from provider profile");
        Ok(user)
    }

    /// Terminal step shared by every successful flow
    async fn issue_tokens(&self, user: User) -> Result<AuthResult> {
        let (access_token, access_token_expires_at) =
            self.token_service.generate_access_token(&user)?;

        let (raw_refresh, entity) = RefreshToken::generate_token_pair(user.id);
        let entity = entity.with_expiry(self.token_service.refresh_token_ttl());
        self.refresh_tokens.create(&entity).await?;

        Ok(AuthResult {
            access_token,
            access_token_expires_at,
            refresh_token: raw_refresh,
            user,
        })
    }
}
