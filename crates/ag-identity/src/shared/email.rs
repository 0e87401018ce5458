//! Email normalization and validation

use regex::Regex;
use std::sync::OnceLock;

use crate::shared::error::{AuthError, Result};

/// Email validation pattern (compiled once)
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Invalid email regex")
    })
}

/// Normalize an email address for storage and lookup.
///
/// Trims surrounding whitespace and lowercases. Empty input maps to
/// `EmailRequired`, anything that fails syntactic validation to `InvalidEmail`.
pub fn normalize_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(AuthError::EmailRequired);
    }
    if !email_pattern().is_match(&normalized) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(normalized)
}
