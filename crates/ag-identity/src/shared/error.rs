//! Identity Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Password login is not enabled for this account")]
    PasswordLoginDisabled,

    #[error("Password policy violation: {reason}")]
    PasswordPolicyViolation { reason: String },

    #[error("Refresh token invalid")]
    RefreshTokenInvalid,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    #[error("OAuth provider not configured: {provider}")]
    OAuthProviderNotConfigured { provider: String },

    #[error("OAuth provider returned no email address")]
    OAuthEmailMissing,

    #[error("OAuth provider email is not verified")]
    OAuthEmailNotVerified,

    #[error("OAuth state invalid")]
    OAuthStateInvalid,

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn policy_violation(reason: impl Into<String>) -> Self {
        Self::PasswordPolicyViolation {
            reason: reason.into(),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
