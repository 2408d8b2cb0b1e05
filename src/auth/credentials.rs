//! Signup and login.
//!
//! Neither operation sits behind the auth gate. Login failures for an
//! unknown username and for a wrong password are the same error, and both
//! run one password verification, so neither the response nor its timing
//! reveals which usernames exist.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AuthError, ValidationError};
use crate::store::{CredentialStore, User};

use super::password::PasswordHasher;
use super::token::TokenService;

/// Maximum username length in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum password length in bytes.
pub const MAX_PASSWORD_LEN: usize = 1024;

/// Turns credentials into users and tokens.
pub struct CredentialService<S> {
    store: Arc<S>,
    hasher: PasswordHasher,
    tokens: TokenService,
    /// Verified against when the username is unknown
    dummy_hash: String,
}

impl<S: CredentialStore> CredentialService<S> {
    pub fn new(store: Arc<S>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        let dummy_hash = hasher.hash("camwatch-unknown-user");
        Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user and return the stored record.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        validate_password(password)?;

        if self.store.find_user_by_username(username).await?.is_some() {
            debug!(username = username, "Signup rejected: username taken");
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {}", e)))?;

        // The store's own uniqueness constraint still covers concurrent signups
        let user = self.store.create_user(username, &password_hash).await?;
        info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.store.find_user_by_username(username).await?;
        let stored = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        let hasher = self.hasher;
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))?;

        let user = match user {
            Some(user) if valid => user,
            Some(user) => {
                debug!(user_id = user.id, "Login failed: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            // The dummy verification result is ignored
            None => {
                debug!("Login failed: unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        info!(user_id = user.id, "User logged in");
        Ok(self.tokens.issue(user.id))
    }
}

fn validate_username(username: &str) -> Result<&str, ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("username", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::new(
            "username",
            format!("must be at most {} characters", MAX_USERNAME_LEN),
        ));
    }
    Ok(trimmed)
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "must not be empty"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at most {} bytes", MAX_PASSWORD_LEN),
        ));
    }
    Ok(())
}
