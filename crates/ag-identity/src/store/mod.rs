//! Store Traits
//!
//! Async persistence interfaces consumed as `Arc<dyn ...>`. Uniqueness
//! constraints (email, token hash, provider identity) are enforced at the
//! store so concurrent writers resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::oauth_account::OAuthAccount;
use crate::auth::refresh_token::RefreshToken;
use crate::role::entity::Role;
use crate::shared::error::Result;
use crate::user::entity::User;

mod memory;

pub use memory::{
    InMemoryOAuthAccountStore, InMemoryRefreshTokenStore, InMemoryRoleStore, InMemoryUserStore,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user; duplicate email yields `EmailAlreadyExists`
    async fn create(&self, user: &User) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn count(&self) -> Result<u64>;

    /// Append role assignments to a user (already-assigned roles are kept once)
    async fn add_roles(&self, user_id: Uuid, roles: &[Role]) -> Result<()>;

    /// Replace a user's role assignments wholesale
    async fn replace_roles(&self, user_id: Uuid, roles: &[Role]) -> Result<()>;

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<User>>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch-or-create roles by name
    ///
    /// Names are trimmed and lowercased; empty names are skipped. The
    /// fetch-or-create is resolved inside the store, so a race between two
    /// callers cannot create a duplicate role.
    async fn ensure_roles(&self, names: &[String]) -> Result<Vec<Role>>;

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Role>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;

    async fn create(&self, role: &Role) -> Result<()>;

    async fn list(&self) -> Result<Vec<Role>>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> Result<()>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;

    /// Revoke a token by id
    ///
    /// Only an Active token transitions to Revoked. Returns whether the
    /// transition happened, so concurrent consumers of the same token admit
    /// exactly one winner.
    async fn revoke(&self, id: Uuid) -> Result<bool>;

    /// Revoke every active token for a user; returns the number revoked
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait OAuthAccountStore: Send + Sync {
    async fn find_by_provider_identity(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<Option<OAuthAccount>>;

    /// Persist a new link; (provider, provider_user_id) is unique
    async fn create(&self, account: &OAuthAccount) -> Result<()>;

    /// Update the stored upstream tokens for an existing link
    async fn update_tokens(
        &self,
        id: Uuid,
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
}
