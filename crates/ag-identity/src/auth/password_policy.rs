//! Password Policy
//!
//! Composition rules applied before hashing.

/// Password policy configuration
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Require at least one uppercase letter
    pub require_uppercase: bool,
    /// Require at least one lowercase letter
    pub require_lowercase: bool,
    /// Require at least one digit
    pub require_digit: bool,
    /// Require at least one special character
    pub require_special: bool,
    /// Special characters that satisfy the requirement
    pub special_chars: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            special_chars: "!@#$%^&*()_+-=[]{}|;':\",./<>?`~".to_string(),
        }
    }
}

impl PasswordPolicy {
    /// Build a policy from the configuration section
    pub fn from_config(config: &ag_config::PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            require_uppercase: config.require_uppercase,
            require_lowercase: config.require_lowercase,
            require_digit: config.require_digit,
            require_special: config.require_special,
            ..Self::default()
        }
    }

    /// Validate a password against the policy
    ///
    /// The email's local part (when at least 3 characters long) must not
    /// appear in the password, compared case-insensitively.
    pub fn validate(&self, email: &str, password: &str) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if password.len() < self.min_length {
            errors.push(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }

        if password.len() > self.max_length {
            errors.push(format!(
                "Password must be at most {} characters",
                self.max_length
            ));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }

        if self.require_special && !password.chars().any(|c| self.special_chars.contains(c)) {
            errors.push("Password must contain at least one special character".to_string());
        }

        let local_part = email.split('@').next().unwrap_or("");
        if local_part.len() >= 3
            && password
                .to_lowercase()
                .contains(&local_part.to_lowercase())
        {
            errors.push("Password must not contain your email address".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Less strict policy for development/testing
    pub fn lenient() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
            special_chars: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "user@example.com";

    #[test]
    fn test_policy_default() {
        let policy = PasswordPolicy::default();

        // Valid password
        assert!(policy.validate(EMAIL, "SecureP@ss123!").is_ok());

        // Too short
        assert!(policy.validate(EMAIL, "Short1!").is_err());

        // No uppercase
        assert!(policy.validate(EMAIL, "nouppercase123!").is_err());

        // No lowercase
        assert!(policy.validate(EMAIL, "NOLOWERCASE123!").is_err());

        // No digit
        assert!(policy.validate(EMAIL, "NoDigitsHere!@#$").is_err());

        // No special char
        assert!(policy.validate(EMAIL, "NoSpecialChars123").is_err());
    }

    #[test]
    fn test_local_part_rejected() {
        let policy = PasswordPolicy::default();

        // Local part embedded, case-insensitive
        let errors = policy.validate(EMAIL, "MyUSERp@ssword123!").unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("email address")));

        // Short local parts are not checked
        let policy = PasswordPolicy::lenient();
        assert!(policy.validate("ab@example.com", "xxabxxxxxx").is_ok());
    }

    #[test]
    fn test_policy_lenient() {
        let policy = PasswordPolicy::lenient();

        // Simple password works
        assert!(policy.validate(EMAIL, "simplepassword").is_ok());

        // Too short still fails
        assert!(policy.validate(EMAIL, "short").is_err());
    }

    #[test]
    fn test_from_config() {
        let mut config = ag_config::PasswordConfig::default();
        config.min_length = 6;
        config.require_special = false;

        let policy = PasswordPolicy::from_config(&config);
        assert!(policy.validate(EMAIL, "Abc123").is_ok());
    }
}
