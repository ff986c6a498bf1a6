//! User creation and login token lifecycle.
//!
//! Passwords are stored as Argon2id PHC strings. Tokens are random opaque
//! strings bound to a username; they never expire and are only removed by an
//! explicit logout.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use crate::repository::{CredentialRepository, RepositoryError};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User already exists")]
    DuplicateUser,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Could not hash password: {0}")]
    Hashing(String),
    #[error("Authentication storage failure: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct AuthService {
    credentials: Arc<dyn CredentialRepository>,
    hasher: Argon2<'static>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self {
            credentials,
            hasher: Argon2::default(),
        }
    }

    /// Register a user and return its username.
    pub fn create_user(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let password_hash = self.hash_password(password)?;
        if !self.credentials.insert_user(username, &password_hash)? {
            return Err(AuthError::DuplicateUser);
        }
        tracing::info!(username, "created user");
        Ok(username.to_string())
    }

    /// Check the password and hand out a fresh token.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let stored = self
            .credentials
            .password_hash(username)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.verify_password(password, &stored) {
            tracing::info!(username, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        self.credentials.insert_token(username, &token)?;
        tracing::info!(username, "issued token");
        Ok(token)
    }

    /// True iff this exact (username, token) pair was issued and not deleted.
    /// Storage failures count as invalid.
    pub fn check_token_valid(&self, username: &str, token: &str) -> bool {
        match self.credentials.token_exists(username, token) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(username, error = %e, "token lookup failed");
                false
            }
        }
    }

    /// Remove a token. Unknown pairs are ignored.
    pub fn delete_token(&self, username: &str, token: &str) {
        if let Err(e) = self.credentials.delete_token(username, token) {
            tracing::error!(username, error = %e, "token deletion failed");
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .hasher
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "unparseable stored password hash");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawtextdb_store::PrimaryStore;

    fn service() -> (AuthService, Arc<PrimaryStore>) {
        let store = Arc::new(PrimaryStore::open_in_memory().unwrap());
        (AuthService::new(store.clone()), store)
    }

    #[test]
    fn test_create_user_then_login() {
        let (auth, _) = service();
        assert_eq!(auth.create_user("alice", "pw123").unwrap(), "alice");

        let token = auth.issue_token("alice", "pw123").unwrap();
        assert!(!token.is_empty());
        assert!(auth.check_token_valid("alice", &token));
    }

    #[test]
    fn test_password_is_not_stored_in_clear() {
        let (auth, store) = service();
        auth.create_user("alice", "pw123").unwrap();

        let stored = store.password_hash("alice").unwrap().unwrap();
        assert_ne!(stored, "pw123");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[test]
    fn test_duplicate_user() {
        let (auth, _) = service();
        auth.create_user("alice", "pw123").unwrap();
        let err = auth.create_user("alice", "other").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
        // The first password still works.
        assert!(auth.issue_token("alice", "pw123").is_ok());
    }

    #[test]
    fn test_wrong_password_or_unknown_user() {
        let (auth, _) = service();
        auth.create_user("alice", "pw123").unwrap();

        assert!(matches!(
            auth.issue_token("alice", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            auth.issue_token("bob", "pw123").unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_tokens_are_fresh_and_bound_to_user() {
        let (auth, _) = service();
        auth.create_user("alice", "pw123").unwrap();
        auth.create_user("bob", "hunter2").unwrap();

        let first = auth.issue_token("alice", "pw123").unwrap();
        let second = auth.issue_token("alice", "pw123").unwrap();
        assert_ne!(first, second);
        assert!(auth.check_token_valid("alice", &first));
        assert!(auth.check_token_valid("alice", &second));
        assert!(!auth.check_token_valid("bob", &first));
    }

    #[test]
    fn test_delete_token() {
        let (auth, _) = service();
        auth.create_user("alice", "pw123").unwrap();
        let token = auth.issue_token("alice", "pw123").unwrap();

        auth.delete_token("alice", &token);
        assert!(!auth.check_token_valid("alice", &token));
        // Deleting again is a no-op.
        auth.delete_token("alice", &token);
    }

    #[test]
    fn test_unknown_token_is_invalid() {
        let (auth, _) = service();
        assert!(!auth.check_token_valid("alice", "made-up"));
        assert!(!auth.check_token_valid("", ""));
    }
}
