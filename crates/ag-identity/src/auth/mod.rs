//! Authentication Aggregate
//!
//! Local credentials, token issuance, and OAuth provider flows.

// Core auth
pub mod password_policy;
pub mod password_service;
pub mod service;
pub mod token_service;

// Refresh tokens
pub mod refresh_token;

// OAuth
pub mod oauth_account;
pub mod provider;
pub mod state_service;

// Re-export main types
pub use password_policy::PasswordPolicy;
pub use password_service::{Argon2Config, PasswordService};
pub use service::{AuthResult, AuthService, AuthServiceConfig, AuthStores};
pub use token_service::{extract_bearer_token, AccessTokenClaims, TokenConfig, TokenService};

pub use refresh_token::{RefreshToken, TokenState};

pub use oauth_account::OAuthAccount;
pub use provider::{
    GitHubProvider, GoogleProvider, OAuthProfile, OAuthProvider, ProviderConfig,
    ProviderEndpoints, UpstreamToken,
};
pub use state_service::{OAuthState, StateService};
