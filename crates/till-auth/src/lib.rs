//! # till-auth
//!
//! Credential handling for the till backend.
//!
//! Two independent pieces:
//!
//! - [`password`]: argon2 hashing and verification of login passwords
//! - [`token`]: HS256 bearer tokens with expiry, issued on login and
//!   verified on every authorized request
//!
//! Nothing here touches the database; the HTTP layer looks the user up and
//! hands the stored hash to [`password::verify_password`].

#![deny(unsafe_code)]

pub mod errors;
pub mod password;
pub mod token;

pub use errors::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};
