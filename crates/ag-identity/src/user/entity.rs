//! User Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
///
/// A user may carry a local password hash, one or more linked OAuth
/// accounts, or both. An account without a password hash is OAuth-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    /// Normalized email address (unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id PHC hash (absent for OAuth-only accounts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub email_verified: bool,

    /// Assigned role names (denormalized)
    #[serde(default)]
    pub roles: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            password_hash: None,
            email_verified: false,
            roles: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_local_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("user@example.com", "User");
        assert_eq!(user.email, "user@example.com");
        assert!(!user.has_local_password());
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("user@example.com", "User").with_password_hash("$argon2id$stub");

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["emailVerified"], serde_json::json!(false));
    }

    #[test]
    fn test_builders() {
        let user = User::new("user@example.com", "User")
            .with_password_hash("$argon2id$stub")
            .with_email_verified(true)
            .with_roles(vec!["admin".to_string()]);

        assert!(user.has_local_password());
        assert!(user.email_verified);
        assert!(user.has_role("admin"));
        assert!(!user.has_role("user"));
    }
}
