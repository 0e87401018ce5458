//! In-Memory Stores
//!
//! Default store implementations backed by `tokio::sync::RwLock` maps.
//! Suitable for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OAuthAccountStore, RefreshTokenStore, RoleStore, UserStore};
use crate::auth::oauth_account::OAuthAccount;
use crate::auth::refresh_token::RefreshToken;
use crate::role::entity::Role;
use crate::shared::error::{AuthError, Result};
use crate::user::entity::User;

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        // Uniqueness check and insert happen under one write guard
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }

    async fn add_roles(&self, user_id: Uuid, roles: &[Role]) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::user_not_found(user_id.to_string()))?;

        for role in roles {
            if !user.roles.contains(&role.name) {
                user.roles.push(role.name.clone());
            }
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn replace_roles(&self, user_id: Uuid, roles: &[Role]) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::user_not_found(user_id.to_string()))?;

        user.roles = roles.iter().map(|r| r.name.clone()).collect();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRoleStore {
    // Keyed by normalized (trimmed, lowercased) role name
    roles: Arc<RwLock<HashMap<String, Role>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn ensure_roles(&self, names: &[String]) -> Result<Vec<Role>> {
        let mut roles = self.roles.write().await;
        let mut resolved = Vec::with_capacity(names.len());

        for name in names {
            let normalized = name.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let role = roles
                .entry(normalized.clone())
                .or_insert_with(|| Role::new(normalized));
            resolved.push(role.clone());
        }

        Ok(resolved)
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(names
            .iter()
            .filter_map(|name| roles.get(&name.trim().to_lowercase()).cloned())
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(&name.trim().to_lowercase()).cloned())
    }

    async fn create(&self, role: &Role) -> Result<()> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(&role.name) {
            return Err(AuthError::internal(format!(
                "Role already exists: {}",
                role.name
            )));
        }
        roles.insert(role.name.clone(), role.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut all: Vec<Role> = roles.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.values().any(|t| t.token_hash == token.token_hash) {
            return Err(AuthError::internal("Duplicate refresh token hash"));
        }
        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if !token.is_revoked() => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0u64;
        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked() {
                token.revoke();
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryOAuthAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, OAuthAccount>>>,
}

impl InMemoryOAuthAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OAuthAccountStore for InMemoryOAuthAccountStore {
    async fn find_by_provider_identity(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<Option<OAuthAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.provider == provider && a.provider_user_id == provider_user_id)
            .cloned())
    }

    async fn create(&self, account: &OAuthAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.provider == account.provider && a.provider_user_id == account.provider_user_id)
        {
            return Err(AuthError::internal(format!(
                "OAuth account already linked: {}/{}",
                account.provider, account.provider_user_id
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_tokens(
        &self,
        id: Uuid,
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| AuthError::internal(format!("OAuth account not found: {}", id)))?;

        account.access_token = access_token;
        account.refresh_token = refresh_token;
        account.expires_at = expires_at;
        account.updated_at = Utc::now();
        Ok(())
    }
}
