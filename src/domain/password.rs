//! Password value object - Domain layer password handling.
//!
//! Argon2id hashing with a random salt per hash. The cost parameters come from
//! configuration; verification reads them back from the stored PHC string.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::{HashingCost, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// `ValidationFailed` if the password is too short, `HashingFailed` if
    /// argon2 rejects the parameters or fails to hash.
    pub fn new(plain_text: &str, cost: &HashingCost) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let hash = Self::hash(plain_text, cost)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
    pub fn verify(&self, plain_text: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&self.hash)
            .map_err(|e| AppError::HashingFailed(format!("Invalid hash format: {}", e)))?;

        match Argon2::default().verify_password(plain_text.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(AppError::HashingFailed(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    fn hash(plain_text: &str, cost: &HashingCost) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2(cost)?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::HashingFailed(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn argon2(cost: &HashingCost) -> AppResult<Argon2<'static>> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AppError::HashingFailed(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
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

    fn cheap() -> HashingCost {
        HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain, &cheap()).unwrap();

        assert!(password.verify(plain).unwrap());
        assert!(!password.verify("WrongPassword123").unwrap());
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "secret1";
        let password = Password::new(plain, &cheap()).unwrap();
        let hash = password.as_str().to_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain, &cheap()).unwrap();
        let pass2 = Password::new(plain, &cheap()).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain).unwrap());
        assert!(pass2.verify(plain).unwrap());
    }

    #[test]
    fn test_hash_carries_cost_parameters() {
        let password = Password::new("secret1", &cheap()).unwrap();
        assert!(password.as_str().starts_with("$argon2id$"));
        assert!(password.as_str().contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_password_too_short() {
        let result = Password::new("abcd", &cheap());
        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(Password::new("abcde", &cheap()).is_ok());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let stored = Password::from_hash("not-a-phc-string".to_string());
        assert!(matches!(
            stored.verify("whatever"),
            Err(AppError::HashingFailed(_))
        ));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        let cost = HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            Password::new("secret1", &cost),
            Err(AppError::HashingFailed(_))
        ));
    }
}
