use thiserror::Error;

use crate::store::CameraId;

/// Errors raised by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// A referenced record does not exist
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// The backing database failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Reasons a token fails verification.
///
/// The auth gate never forwards these to the client; they exist for logging
/// and for tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token is not three base64url segments with JSON header and claims
    #[error("Malformed token")]
    Malformed,

    /// Header names an algorithm other than HS256
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not match the payload under the configured secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token expired
    #[error("Token expired at {expired_at} (current time: {current_time})")]
    Expired { expired_at: u64, current_time: u64 },
}

/// A request field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from the signup/login flow.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Unknown username or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(StoreError),

    /// Password hashing task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(username) => AuthError::UsernameTaken(username),
            other => AuthError::Store(other),
        }
    }
}

/// Errors from the camera registry.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("Camera not found: {0}")]
    NotFound(CameraId),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the alert feed.
#[derive(Debug, Clone, Error)]
pub enum AlertError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
