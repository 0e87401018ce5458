//! AuthGate Identity
//!
//! Authentication and identity linking:
//! - Local accounts with Argon2id password hashing and policy checks
//! - HS256 access tokens and single-use rotating refresh tokens
//! - OAuth login and account linking (Google, GitHub)
//! - Role assignment with first-admin promotion
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains its domain entities; persistence traits live in
//! `store`, with in-memory implementations for tests and embedded use.

// Core aggregates
pub mod role;
pub mod user;

// Authentication & authorization
pub mod auth;

// Persistence
pub mod store;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::email::normalize_email;
pub use shared::error::{AuthError, Result};
pub use shared::logging::init_logging;

// Re-export main entity types for convenience
pub use auth::oauth_account::OAuthAccount;
pub use auth::refresh_token::{RefreshToken, TokenState};
pub use role::entity::Role;
pub use user::entity::User;

// Re-export services
pub use auth::password_policy::PasswordPolicy;
pub use auth::password_service::{Argon2Config, PasswordService};
pub use auth::provider::{
    GitHubProvider, GoogleProvider, OAuthProfile, OAuthProvider, UpstreamToken,
};
pub use auth::service::{AuthResult, AuthService, AuthServiceConfig, AuthStores};
pub use auth::state_service::{OAuthState, StateService};
pub use auth::token_service::{extract_bearer_token, AccessTokenClaims, TokenConfig, TokenService};

// Re-export stores
pub use store::{
    InMemoryOAuthAccountStore, InMemoryRefreshTokenStore, InMemoryRoleStore, InMemoryUserStore,
    OAuthAccountStore, RefreshTokenStore, RoleStore, UserStore,
};
