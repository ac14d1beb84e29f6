//! User directory repository.
//!
//! The `users` collection holds one document per account, keyed by the
//! user identifier. The credential hash lives in the same document; it
//! never leaves this module except to the auth service.

use serde::{Deserialize, Serialize};

use maison_core::{DisplayColor, Role, UserKey};

use super::RepositoryError;
use crate::models::User;
use crate::store::{MemoryStore, USERS_COLLECTION};

/// Raw document shape of a directory entry.
#[derive(Debug, Serialize, Deserialize)]
struct UserDoc {
    name: String,
    role: Role,
    color: DisplayColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
}

impl UserDoc {
    fn into_user(self, key: UserKey) -> User {
        User {
            key,
            name: self.name,
            role: self.role,
            color: self.color,
        }
    }
}

/// Repository for user directory operations.
pub struct UserDirectory<'a> {
    store: &'a MemoryStore,
}

impl<'a> UserDirectory<'a> {
    /// Create a new directory repository.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Get a user by their identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document is
    /// malformed.
    pub async fn get(&self, key: &UserKey) -> Result<Option<User>, RepositoryError> {
        match self.store.get(USERS_COLLECTION, key.as_str()).await {
            Some(value) => {
                let doc = parse_doc(key, value)?;
                Ok(Some(doc.into_user(key.clone())))
            }
            None => Ok(None),
        }
    }

    /// Get a user together with their stored credential hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document is
    /// malformed.
    pub async fn get_with_credential(
        &self,
        key: &UserKey,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        match self.store.get(USERS_COLLECTION, key.as_str()).await {
            Some(value) => {
                let doc = parse_doc(key, value)?;
                let hash = doc.password_hash.clone();
                Ok(Some((doc.into_user(key.clone()), hash)))
            }
            None => Ok(None),
        }
    }

    /// List every user in the directory, in key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on the first malformed
    /// document.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let docs = self.store.list(USERS_COLLECTION).await;
        let mut users = Vec::with_capacity(docs.len());
        for (id, value) in docs {
            let key = UserKey::parse(&id).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid user key {id:?}: {e}"))
            })?;
            let doc = parse_doc(&key, value)?;
            users.push(doc.into_user(key));
        }
        Ok(users)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the key already exists.
    pub async fn create(
        &self,
        user: &User,
        password_hash: Option<String>,
    ) -> Result<(), RepositoryError> {
        if self.store.get(USERS_COLLECTION, user.key.as_str()).await.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "user {} already exists",
                user.key
            )));
        }

        let doc = UserDoc {
            name: user.name.clone(),
            role: user.role,
            color: user.color.clone(),
            password_hash,
        };
        self.store
            .set(
                USERS_COLLECTION,
                user.key.as_str(),
                serde_json::to_value(doc).map_err(crate::store::StoreError::from)?,
            )
            .await?;
        Ok(())
    }

    /// Delete a user from the directory.
    ///
    /// Existing reservation entries are deliberately left alone: they carry
    /// a denormalized owner snapshot.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store operation fails.
    pub async fn delete(&self, key: &UserKey) -> Result<bool, RepositoryError> {
        let existed = self.store.get(USERS_COLLECTION, key.as_str()).await.is_some();
        self.store.delete(USERS_COLLECTION, key.as_str()).await?;
        Ok(existed)
    }

    /// Update a user's profile fields. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        key: &UserKey,
        name: Option<&str>,
        role: Option<Role>,
        color: Option<&DisplayColor>,
    ) -> Result<(), RepositoryError> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = name {
            fields.insert("name".to_owned(), serde_json::Value::String(name.to_owned()));
        }
        if let Some(role) = role {
            fields.insert(
                "role".to_owned(),
                serde_json::to_value(role).map_err(crate::store::StoreError::from)?,
            );
        }
        if let Some(color) = color {
            fields.insert(
                "color".to_owned(),
                serde_json::Value::String(color.as_str().to_owned()),
            );
        }
        if fields.is_empty() {
            return Ok(());
        }

        self.store
            .update_fields(USERS_COLLECTION, key.as_str(), fields)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound { .. } => RepositoryError::NotFound,
                other => RepositoryError::Store(other),
            })
    }

    /// Replace a user's credential hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_credential(
        &self,
        key: &UserKey,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut fields = serde_json::Map::new();
        fields.insert(
            "password_hash".to_owned(),
            serde_json::Value::String(password_hash.to_owned()),
        );
        self.store
            .update_fields(USERS_COLLECTION, key.as_str(), fields)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound { .. } => RepositoryError::NotFound,
                other => RepositoryError::Store(other),
            })
    }

    /// Remove a user's credential so they can register a fresh password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn clear_credential(&self, key: &UserKey) -> Result<(), RepositoryError> {
        let mut fields = serde_json::Map::new();
        fields.insert("password_hash".to_owned(), serde_json::Value::Null);
        self.store
            .update_fields(USERS_COLLECTION, key.as_str(), fields)
            .await
            .map_err(|e| match e {
                crate::store::StoreError::NotFound { .. } => RepositoryError::NotFound,
                other => RepositoryError::Store(other),
            })
    }
}

fn parse_doc(key: &UserKey, value: serde_json::Value) -> Result<UserDoc, RepositoryError> {
    serde_json::from_value(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid user document for {key}: {e}"))
    })
}
