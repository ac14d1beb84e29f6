//! Initial household roster.
//!
//! The directory is an access list: accounts exist before anyone logs in,
//! and each member claims theirs by setting a first password. Seeding is
//! idempotent; existing accounts are never touched.

use tracing::info;

use maison_core::{DisplayColor, Role, UserKey};

use crate::db::{RepositoryError, directory::UserDirectory};
use crate::models::User;
use crate::store::MemoryStore;

/// The household members every fresh deployment starts with.
const INITIAL_USERS: &[(&str, &str, Role)] = &[
    ("admin", "Admin", Role::Admin),
    ("brother", "Brother", Role::User),
    ("parents", "Parents", Role::User),
    ("me", "Me", Role::User),
    ("friend", "Family Friend", Role::User),
];

/// Create any missing initial users. Returns how many were created.
///
/// # Errors
///
/// Returns `RepositoryError` if the directory cannot be read or written.
pub async fn seed_users(store: &MemoryStore) -> Result<usize, RepositoryError> {
    let directory = UserDirectory::new(store);

    let mut created = 0;
    for (index, (key, name, role)) in INITIAL_USERS.iter().enumerate() {
        let key = UserKey::parse(key).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid seed user key {key:?}: {e}"))
        })?;
        if directory.get(&key).await?.is_some() {
            continue;
        }

        let user = User {
            key,
            name: (*name).to_owned(),
            role: *role,
            color: DisplayColor::from_palette(index),
        };
        directory.create(&user, None).await?;
        created += 1;
    }

    if created > 0 {
        info!(created, "seeded initial users");
    }
    Ok(created)
}
