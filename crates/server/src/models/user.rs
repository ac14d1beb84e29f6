//! User domain types.
//!
//! These are validated domain objects, separate from the raw store
//! documents in `db::directory`.

use serde::Serialize;

use maison_core::{DisplayColor, Role, UserKey, UserRef};

/// A directory user (domain type). Serializes without any credential
/// material; the password hash lives only on the store document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier (email or username); the directory key.
    pub key: UserKey,
    /// Display name shown on calendar entries.
    pub name: String,
    /// Permission role.
    pub role: Role,
    /// Display color for this user's reservations.
    pub color: DisplayColor,
}

impl User {
    /// The acting-user reference written into reservation entries.
    #[must_use]
    pub fn user_ref(&self) -> UserRef {
        UserRef::new(self.key.clone(), self.name.clone())
    }
}
