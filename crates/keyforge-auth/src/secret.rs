//! Credential generation and verification.
//!
//! This module provides cryptographically secure secret generation and
//! Argon2-based hashing for user passwords and client secrets.
//!
//! # Security
//!
//! - Client secrets are 256-bit random values (32 bytes) with a "kf_" prefix
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//!
//! # Example
//!
//! ```
//! use keyforge_auth::secret::{generate_client_secret, hash_password, verify_password};
//!
//! // Generate a new secret
//! let secret = generate_client_secret();
//! assert!(secret.starts_with("kf_"));
//!
//! // Hash for storage
//! let hash = hash_password(&secret).unwrap();
//!
//! // Verify later
//! assert!(verify_password(&secret, &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

/// Generate a new cryptographically secure client secret.
///
/// The secret is a 256-bit (32 bytes) random value encoded as hexadecimal
/// with a "kf_" prefix for easy identification.
///
/// # Format
///
/// `kf_{64 hex characters}` (67 characters total)
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("kf_{}", hex::encode(bytes))
}

/// Hash a credential for secure storage using Argon2id.
///
/// Suitable for user passwords and client secrets alike. Uses a
/// cryptographically secure random salt (OsRng), default Argon2id
/// parameters, and the PHC string format for storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
///
/// # Example
///
/// ```
/// use keyforge_auth::secret::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a credential against a stored Argon2 hash.
///
/// # Returns
///
/// `Ok(true)` if the credential matches the hash, `Ok(false)` if it doesn't.
/// Returns `Err` only if the hash format is invalid.
///
/// # Example
///
/// ```
/// use keyforge_auth::secret::{hash_password, verify_password};
///
/// let hash = hash_password("my_secure_password").unwrap();
///
/// assert!(verify_password("my_secure_password", &hash).unwrap());
/// assert!(!verify_password("wrong_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_format() {
        let secret = generate_client_secret();
        assert_eq!(secret.len(), 67);
        assert!(secret.starts_with("kf_"));
        assert!(secret[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_secret_uniqueness() {
        let a = generate_client_secret();
        let b = generate_client_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_and_verify() {
        let secret = generate_client_secret();
        let hash = hash_password(&secret).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&secret, &hash).unwrap());
        assert!(!verify_password("wrong_secret", &hash).unwrap());
    }

    #[test]
    fn test_same_secret_different_hashes() {
        // Random salts mean hashing is non-deterministic.
        let hash1 = hash_password("password").unwrap();
        let hash2 = hash_password("password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("password", &hash1).unwrap());
        assert!(verify_password("password", &hash2).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
    }
}
