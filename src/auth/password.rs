use super::AuthError;
use bcrypt::{hash, verify};

/// Salted bcrypt hashing with a configured work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns whether `password` matches `hashed_password`.
    ///
    /// A malformed digest is an internal error rather than a mismatch.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AuthError> {
        verify(password, hashed_password)
            .map_err(|e| AuthError::Internal(format!("Failed to verify password: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::new(4);
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(password, &hashed).unwrap());
        assert!(!hasher.verify("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new(4);
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same", &first).unwrap());
        assert!(hasher.verify("same", &second).unwrap());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match PasswordHasher::new(4).verify("test_password123", "invalidhashformat") {
            Err(AuthError::Internal(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
