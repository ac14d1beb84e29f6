//! Authentication service.
//!
//! Access is by invitation: every account exists in the user directory
//! before its owner ever logs in. "Signup" therefore means claiming a
//! pre-registered account by setting its first password, and login checks
//! an Argon2id hash stored on the directory document.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use maison_core::UserKey;

use crate::db::directory::UserDirectory;
use crate::models::User;
use crate::store::MemoryStore;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    directory: UserDirectory<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self {
            directory: UserDirectory::new(store),
        }
    }

    /// Login with a user key and password.
    ///
    /// Unknown keys and wrong passwords produce the same error so login
    /// attempts cannot probe the directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the key/password is wrong
    /// or the account has no password yet.
    pub async fn login(&self, key: &UserKey, password: &str) -> Result<User, AuthError> {
        let (user, hash) = self
            .directory
            .get_with_credential(key)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &hash)?;

        Ok(user)
    }

    /// Claim a pre-registered account by setting its first password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotOnAccessList` if the key is not in the
    /// directory, `AuthError::AlreadyRegistered` if a password is already
    /// set, and `AuthError::WeakPassword` if the password is too short.
    pub async fn signup(&self, key: &UserKey, password: &str) -> Result<User, AuthError> {
        let (user, hash) = self
            .directory
            .get_with_credential(key)
            .await?
            .ok_or(AuthError::NotOnAccessList)?;

        if hash.is_some() {
            return Err(AuthError::AlreadyRegistered);
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;
        self.directory.set_credential(key, &password_hash).await?;

        Ok(user)
    }

    /// Clear a user's password so they can claim the account again.
    ///
    /// Capability-checked by the caller; this is an administrative reset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the key is not in the directory.
    pub async fn reset_password(&self, key: &UserKey) -> Result<(), AuthError> {
        self.directory
            .clear_credential(key)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Get a user by key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, key: &UserKey) -> Result<User, AuthError> {
        self.directory
            .get(key)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
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
    use maison_core::{DisplayColor, Role};

    async fn seed_account(store: &MemoryStore, key: &str, password: Option<&str>) {
        let directory = UserDirectory::new(store);
        let user = User {
            key: UserKey::parse(key).unwrap(),
            name: key.to_owned(),
            role: Role::User,
            color: DisplayColor::fallback(),
        };
        let hash = password.map(|p| hash_password(p).unwrap());
        directory.create(&user, hash).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let store = MemoryStore::new();
        seed_account(&store, "me", Some("hunter2-but-longer")).await;

        let auth = AuthService::new(&store);
        let key = UserKey::parse("me").unwrap();

        let user = auth.login(&key, "hunter2-but-longer").await.unwrap();
        assert_eq!(user.key, key);

        let result = auth.login(&key, "wrong-password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_key_is_invalid_credentials() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let key = UserKey::parse("ghost").unwrap();

        let result = auth.login(&key, "whatever-long").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_signup_claims_account() {
        let store = MemoryStore::new();
        seed_account(&store, "sarah", None).await;

        let auth = AuthService::new(&store);
        let key = UserKey::parse("sarah").unwrap();

        auth.signup(&key, "first-password").await.unwrap();
        auth.login(&key, "first-password").await.unwrap();
    }

    #[tokio::test]
    async fn test_signup_requires_access_list() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let key = UserKey::parse("stranger").unwrap();

        let result = auth.signup(&key, "some-password").await;
        assert!(matches!(result, Err(AuthError::NotOnAccessList)));
    }

    #[tokio::test]
    async fn test_signup_rejects_claimed_account() {
        let store = MemoryStore::new();
        seed_account(&store, "me", Some("already-claimed")).await;

        let auth = AuthService::new(&store);
        let key = UserKey::parse("me").unwrap();

        let result = auth.signup(&key, "new-password").await;
        assert!(matches!(result, Err(AuthError::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password() {
        let store = MemoryStore::new();
        seed_account(&store, "me", None).await;

        let auth = AuthService::new(&store);
        let key = UserKey::parse("me").unwrap();

        let result = auth.signup(&key, "short").await;
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_reset_reopens_signup() {
        let store = MemoryStore::new();
        seed_account(&store, "me", Some("old-password")).await;

        let auth = AuthService::new(&store);
        let key = UserKey::parse("me").unwrap();

        auth.reset_password(&key).await.unwrap();

        // Old password no longer works and the account can be claimed again.
        let result = auth.login(&key, "old-password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        auth.signup(&key, "next-password").await.unwrap();
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("a-decent-password").unwrap();
        assert!(verify_password("a-decent-password", &hash).is_ok());
        assert!(verify_password("another-password", &hash).is_err());
    }
}
