//! Password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{AuthError, AuthResult};

/// Hashes a password with Argon2id and a random salt.
///
/// Returns the PHC string (algorithm, parameters, salt and hash).
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verifies a password against a stored PHC string.
///
/// A malformed stored hash is reported as invalid credentials so callers
/// never reveal which part of a login failed.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::warn!(error = %e, "Stored password hash is malformed");
        AuthError::InvalidCredentials
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter22"));
        assert!(verify_password("hunter22", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = hash_password("hunter22").unwrap();

        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("hunter22").unwrap();
        let second = hash_password("hunter22").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("hunter22", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
