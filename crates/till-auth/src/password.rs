//! Password hashing.
//!
//! Thin wrappers over `password-auth` (argon2 with per-hash salts). Hashes
//! are PHC strings safe to store as-is; verification re-derives from the
//! embedded parameters, so parameter upgrades don't invalidate old hashes.

/// Hash a plaintext password for storage.
#[must_use]
pub fn hash_password(plain: &str) -> String {
    password_auth::generate_hash(plain)
}

/// Check a plaintext password against a stored hash.
///
/// Returns `false` for wrong passwords and for malformed hashes; callers
/// treat both identically as failed authentication.
#[must_use]
pub fn verify_password(plain: &str, hash: &str) -> bool {
    password_auth::verify_password(plain, hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies() {
        let hash = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("hunter2");
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
