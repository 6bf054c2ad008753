//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself.
//!
//! Hashing is CPU-bound, so request handlers use the async [`hash_password`]
//! and [`verify_password`] wrappers, which run the work on the blocking thread
//! pool instead of stalling the request executor. The `_sync` variants exist
//! for startup paths and tests.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tessera_core::error::CoreError;

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
pub fn hash_password_sync(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password_sync(
    password: &str,
    hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Hash a password on the blocking thread pool.
pub async fn hash_password(password: String) -> Result<String, CoreError> {
    tokio::task::spawn_blocking(move || hash_password_sync(&password))
        .await
        .map_err(|e| CoreError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))
}

/// Verify a password against a stored hash on the blocking thread pool.
pub async fn verify_password(password: String, hash: String) -> Result<bool, CoreError> {
    tokio::task::spawn_blocking(move || verify_password_sync(&password, &hash))
        .await
        .map_err(|e| CoreError::Internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password_sync(password).expect("hashing should succeed");

        // The hash must be a valid PHC string starting with the argon2id identifier.
        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );
        assert_ne!(hash, password, "hash must never equal the plaintext");

        let verified = verify_password_sync(password, &hash).expect("verify should succeed");
        assert!(verified, "correct password should verify as true");
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password_sync("real-password").expect("hashing should succeed");
        let verified =
            verify_password_sync("wrong-password", &hash).expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Random salts: two hashes of the same input must differ.
        let a = hash_password_sync("repeated-password").expect("hashing should succeed");
        let b = hash_password_sync("repeated-password").expect("hashing should succeed");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_async_wrappers_round_trip() {
        let hash = hash_password("off-thread-password".to_string())
            .await
            .expect("hashing should succeed");

        let ok = verify_password("off-thread-password".to_string(), hash.clone())
            .await
            .expect("verify should succeed");
        assert!(ok);

        let bad = verify_password("wrong".to_string(), hash)
            .await
            .expect("verify should succeed");
        assert!(!bad);
    }
}
