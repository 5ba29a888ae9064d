//! Password hashing
//!
//! Digests are bcrypt (`$2b$...`), so rows written by earlier deployments of
//! the application verify unchanged.

use crate::error::{Result, StoreError};

pub use bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hash a plaintext password.
///
/// Runs on the blocking thread pool, bcrypt at production cost takes
/// hundreds of milliseconds.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(StoreError::PasswordHash(format!(
            "cost {} outside {}..={}",
            cost, MIN_COST, MAX_COST
        )));
    }

    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost).map_err(StoreError::from))
        .await
        .map_err(|e| StoreError::PasswordHash(format!("Task join error: {}", e)))?
}

/// Check `password` against a stored bcrypt digest.
///
/// A mismatch is `Ok(false)`. An unparseable digest is an error.
pub fn verify(password: &str, digest: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, digest)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = tokio_test::block_on(hash_password("correct horse", MIN_COST)).unwrap();

        assert!(digest.starts_with("$2"));
        assert_ne!(digest, "correct horse");
        assert!(verify("correct horse", &digest).unwrap());
        assert!(!verify("correct horse ", &digest).unwrap());
        assert!(!verify("", &digest).unwrap());
    }

    #[test]
    fn test_rejects_out_of_range_cost() {
        let result = tokio_test::block_on(hash_password("secret", 3));
        assert!(matches!(result, Err(StoreError::PasswordHash(_))));
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let result = verify("secret", "not-a-bcrypt-digest");
        assert!(matches!(result, Err(StoreError::PasswordHash(_))));
    }
}
