#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Copy)]
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

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// A malformed stored hash counts as a mismatch rather than an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_password_only() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!PasswordHasher::default().verify("anything", "not-a-bcrypt-hash"));
    }
}
