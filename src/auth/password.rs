//! Password hashing and verification using bcrypt.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The stored digest is not a valid bcrypt hash (corrupted data)
    #[error("stored password digest is invalid: {0}")]
    Verification(String),
}

/// Salted adaptive password hasher with a fixed work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password. Every input is hashable; failures only come
    /// from the RNG or an invalid cost.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Compare a plaintext password with a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch and `Err(Verification)` only when the
    /// digest itself cannot be parsed.
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, CredentialError> {
        bcrypt::verify(plaintext, digest).map_err(|e| CredentialError::Verification(e.to_string()))
    }

    /// `hash` on the blocking pool
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, CredentialError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| CredentialError::Hashing(format!("hashing task failed: {}", e)))?
    }

    /// `verify` on the blocking pool
    pub async fn verify_blocking(&self, digest: String, plaintext: String) -> Result<bool, CredentialError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &plaintext))
            .await
            .map_err(|e| CredentialError::Verification(format!("verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn correct_password_matches() {
        let digest = hasher().hash("hunter2").unwrap();
        assert!(hasher().verify(&digest, "hunter2").unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let digest = hasher().hash("hunter2").unwrap();
        assert!(!hasher().verify(&digest, "hunter3").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hasher().hash("same").unwrap();
        let b = hasher().hash("same").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$2"));
    }

    #[test]
    fn empty_password_is_hashable() {
        let digest = hasher().hash("").unwrap();
        assert!(hasher().verify(&digest, "").unwrap());
    }

    #[test]
    fn malformed_digest_is_a_verification_error() {
        let result = hasher().verify("not-a-hash", "pw");
        assert!(matches!(result, Err(CredentialError::Verification(_))));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let digest = hasher().hash_blocking("pw1234".into()).await.unwrap();
        assert!(hasher().verify_blocking(digest.clone(), "pw1234".into()).await.unwrap());
        assert!(!hasher().verify_blocking(digest, "nope".into()).await.unwrap());
    }
}
