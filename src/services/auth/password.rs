//! Salted, adaptive password hashing (Argon2id, PHC string format).
use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Digest compared against when the account does not exist, so the
/// unknown-account path does the same work as the wrong-password path.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| hash("not-a-real-password").ok());

pub fn hash(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// `false` for a wrong password and for an unparseable digest.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        tracing::warn!("stored password digest is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

pub fn verify_dummy(plaintext: &str) {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify(plaintext, digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let digest = hash("s3cret").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify("s3cret", &digest));
        assert!(!verify("wrong", &digest));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash("pw").unwrap(), hash("pw").unwrap());
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify("pw", "not-a-phc-string"));
        assert!(!verify("pw", ""));
    }
}
