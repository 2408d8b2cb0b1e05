//! Identity: password hashing, signed tokens and the signup/login flow.
//!
//! The HTTP-facing half (the auth gate middleware and the `AuthContext`
//! extractor) lives in [`crate::server::auth`].

pub mod credentials;
pub mod password;
pub mod token;

pub use credentials::{CredentialService, MAX_PASSWORD_LEN, MAX_USERNAME_LEN};
pub use password::{PasswordHasher, DEFAULT_PASSWORD_ITERATIONS, MIN_PASSWORD_ITERATIONS};
pub use token::{TokenService, DEFAULT_TOKEN_TTL};
