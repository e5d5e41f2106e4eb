//! Password hashing for StudySync.
//!
//! Uses Argon2id with a per-password random salt.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password does not match the hash.
    #[error("password verification failed")]
    VerificationFailed,
}

/// Memory cost in KiB (19 MiB).
const M_COST: u32 = 19 * 1024;
/// Iterations.
const T_COST: u32 = 2;
/// Lanes.
const P_COST: u32 = 1;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(M_COST, T_COST, P_COST, None)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted string that embeds the salt and parameters.
///
/// # Examples
///
/// ```
/// use studysync::hash_password;
///
/// let hash = hash_password("hunter2").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Parameters are read from the hash itself, so hashes made with older
/// settings keep verifying.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_string() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(!hash.contains("test_password_123"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).is_ok());
    }

    #[test]
    fn test_verify_password_wrong() {
        let hash = hash_password("correct_password").unwrap();
        let result = verify_password("wrong_password", &hash);
        assert!(matches!(result, Err(PasswordError::VerificationFailed)));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("any_password", "plaintext");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_unicode_password() {
        let hash = hash_password("パスワード🔑").unwrap();
        assert!(verify_password("パスワード🔑", &hash).is_ok());
    }
}
