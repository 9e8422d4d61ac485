//! Credential hashing and session token helpers
//!
//! # Architecture
//!
//! - Passwords are stored as `hex(sha256(salt || password))` with a
//!   per-user random 32-hex-char salt. Hash and salt live in separate
//!   columns of the `users` table.
//! - Session tokens are random v4 UUIDs; the token is the primary key of
//!   the `sessions` table and travels in an HttpOnly cookie.
//!
//! This module contains ONLY pure functions. No HTTP framework
//! dependencies (Axum, etc.) and no database access - those are in
//! service-specific code.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of the per-user salt in hex characters
pub const SALT_LEN: usize = 32;

// ========================================
// Password Hashing
// ========================================

/// Generate a fresh random salt as hex characters
pub fn generate_salt() -> String {
    let bytes: [u8; SALT_LEN / 2] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// Returns 64 hex characters (SHA-256 digest of `salt || password`).
///
/// # Examples
///
/// ```
/// use zhiyuan_common::auth::hash_password;
///
/// let hash = hash_password("0123abcd", "secret");
/// assert_eq!(hash.len(), 64);
/// assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify a password against a stored salt and hash
pub fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    hash_password(salt, password) == stored_hash
}

// ========================================
// Session Tokens
// ========================================

/// Generate a new opaque session token
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_password("aabbccdd", "hunter2");
        let b = hash_password("aabbccdd", "hunter2");
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_changes_hash() {
        let a = hash_password("aabbccdd", "hunter2");
        let b = hash_password("ddccbbaa", "hunter2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_round_trip() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "correct horse");

        assert!(verify_password(&salt, "correct horse", &hash));
        assert!(!verify_password(&salt, "wrong horse", &hash));
    }

    #[test]
    fn test_generated_salts_are_unique() {
        let salts: Vec<String> = (0..16).map(|_| generate_salt()).collect();
        for (i, a) in salts.iter().enumerate() {
            assert_eq!(a.len(), SALT_LEN);
            assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
            for b in salts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36); // uuid v4 text form
    }
}
