//! Password value object backed by Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Hash checked when the account is unknown or has no password, so that the
/// failure path costs the same as a real verification.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-password-for-timing", &salt)
        .map(|h| h.to_string())
        .ok()
});

/// Stored password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password").field("hash", &"[REDACTED]").finish()
    }
}

impl Password {
    /// Hash a plain-text password after enforcing the minimum length.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();
        Ok(Self { hash })
    }

    /// Wrap a hash loaded from the database.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Check a plain-text password; malformed hashes never verify.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }

    /// Verify against an optional stored hash, spending a full Argon2
    /// verification even when there is nothing to compare against.
    pub fn verify_stored(stored: Option<&str>, plain_text: &str) -> bool {
        match stored {
            Some(hash) => Password::from_hash(hash.to_string()).verify(plain_text),
            None => {
                if let Some(dummy) = DUMMY_HASH.as_deref() {
                    let _ = Password::from_hash(dummy.to_string()).verify(plain_text);
                }
                false
            }
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("correct-password").unwrap();
        assert!(password.verify("correct-password"));
        assert!(!password.verify("wrong-password"));
    }

    #[test]
    fn test_restored_hash_verifies() {
        let hash = Password::new("correct-password").unwrap().into_string();
        assert!(Password::from_hash(hash).verify("correct-password"));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let a = Password::new("same-password").unwrap();
        let b = Password::new("same-password").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(matches!(Password::new("short"), Err(AppError::Validation(_))));
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!Password::from_hash("not-a-hash".to_string()).verify("anything"));
    }

    #[test]
    fn test_verify_stored_without_hash_fails() {
        assert!(!Password::verify_stored(None, "correct-password"));
        let hash = Password::new("correct-password").unwrap().into_string();
        assert!(Password::verify_stored(Some(&hash), "correct-password"));
    }
}
