//! Authentication service.
//!
//! Provides email and password accounts backed by an in-memory directory.
//! Passwords are stored as Argon2id hashes.

mod error;

pub use error::AuthError;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use bazaar_core::{Email, UserId};

use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

struct StoredAccount {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct DirectoryInner {
    accounts: HashMap<Email, StoredAccount>,
    last_id: i32,
}

/// Registered accounts, keyed by email.
///
/// Cheaply cloneable; clones share the same accounts.
#[derive(Clone, Default)]
pub struct AccountDirectory {
    inner: Arc<RwLock<DirectoryInner>>,
}

impl AccountDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account by id.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .accounts
            .values()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone())
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .accounts
            .len()
    }

    /// Whether no accounts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, email: Email, password_hash: String) -> Result<User, AuthError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.accounts.contains_key(&email) {
            return Err(AuthError::UserAlreadyExists);
        }

        inner.last_id = inner.last_id.saturating_add(1);
        let user = User {
            id: UserId::new(inner.last_id),
            email: email.clone(),
            created_at: Utc::now(),
        };
        inner.accounts.insert(
            email,
            StoredAccount {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    fn credentials(&self, email: &Email) -> Option<(User, String)> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .accounts
            .get(email)
            .map(|account| (account.user.clone(), account.password_hash.clone()))
    }
}

/// Authentication service.
///
/// Handles account registration and login.
pub struct AuthService<'a> {
    accounts: &'a AccountDirectory,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a AccountDirectory) -> Self {
        Self { accounts }
    }

    /// Register a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[tracing::instrument(skip_all)]
    pub fn register_with_password(
        &self,
        email: &str,
        password: &SecretString,
        confirm: &SecretString,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let password = password.expose_secret();
        validate_password(password)?;
        if password != confirm.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = hash_password(password)?;
        let user = self.accounts.insert(email, password_hash)?;

        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[tracing::instrument(skip_all)]
    pub fn login_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .accounts
            .credentials(&email)
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password.expose_secret(), &password_hash)?;

        tracing::info!(user_id = %user.id, "Account signed in");
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_register_then_login() {
        let accounts = AccountDirectory::new();
        let auth = AuthService::new(&accounts);

        let user = auth
            .register_with_password("Ada@Example.com", &secret("correct horse"), &secret("correct horse"))
            .unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.email.as_str(), "ada@example.com");

        let signed_in = auth
            .login_with_password("ada@example.com", &secret("correct horse"))
            .unwrap();
        assert_eq!(signed_in.id, user.id);
        assert_eq!(accounts.get(user.id), Some(user));
    }

    #[test]
    fn test_wrong_password_is_invalid_credentials() {
        let accounts = AccountDirectory::new();
        let auth = AuthService::new(&accounts);
        auth.register_with_password("a@b.co", &secret("password1"), &secret("password1"))
            .unwrap();

        let err = auth
            .login_with_password("a@b.co", &secret("password2"))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = auth
            .login_with_password("nobody@b.co", &secret("password1"))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let accounts = AccountDirectory::new();
        let auth = AuthService::new(&accounts);
        auth.register_with_password("a@b.co", &secret("password1"), &secret("password1"))
            .unwrap();

        let err = auth
            .register_with_password("A@B.CO", &secret("password9"), &secret("password9"))
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_register_validates_input() {
        let accounts = AccountDirectory::new();
        let auth = AuthService::new(&accounts);

        assert!(matches!(
            auth.register_with_password("not-an-email", &secret("password1"), &secret("password1")),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register_with_password("a@b.co", &secret("short"), &secret("short")),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register_with_password("a@b.co", &secret("password1"), &secret("password2")),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash).is_ok());
        assert!(verify_password("hunter3hunter3", &hash).is_err());
    }
}
