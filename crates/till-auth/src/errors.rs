//! Error types for credential handling.

use thiserror::Error;

/// Errors that can occur during credential issuance or verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username/password pair did not match a registered user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Bearer token failed signature or structural validation.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// Token could not be created.
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(AuthError::TokenExpired.to_string(), "token expired");
        assert!(
            AuthError::TokenInvalid("bad signature".into())
                .to_string()
                .contains("bad signature")
        );
    }
}
