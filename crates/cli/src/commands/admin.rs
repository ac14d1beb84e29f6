//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! maison-cli admin create -u superadmin -n "Super Admin" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `MAISON_STORE_PATH` - JSON store snapshot to operate on

use thiserror::Error;

use maison_core::{DisplayColor, Role, UserKey};
use maison_server::db::directory::UserDirectory;
use maison_server::models::User;
use maison_server::services::auth;

use super::CliError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Store access failed.
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Invalid user key.
    #[error("Invalid user key: {0}")]
    InvalidKey(String),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: guest, user, admin, super_admin")]
    InvalidRole(String),

    /// Invalid color.
    #[error("Invalid color: {0}. Expected #RRGGBB")]
    InvalidColor(String),

    /// Password hashing or validation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] maison_server::services::auth::AuthError),

    /// Directory operation failed.
    #[error("Directory error: {0}")]
    Directory(#[from] maison_server::db::RepositoryError),
}

/// Create a new account with a password already set.
///
/// Unlike the web signup flow this skips the access-list claim step, so it
/// can bootstrap the very first admin of a deployment.
pub async fn create_account(
    user: &str,
    name: &str,
    password: &str,
    role: &str,
    color: &str,
) -> Result<(), AdminError> {
    let key = UserKey::parse(user).map_err(|e| AdminError::InvalidKey(e.to_string()))?;
    let role: Role = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let color =
        DisplayColor::parse(color).map_err(|_| AdminError::InvalidColor(color.to_owned()))?;

    let password_hash = auth::hash_password(password)?;

    let store = super::open_store().await?;
    let directory = UserDirectory::new(&store);
    let account = User {
        key,
        name: name.to_owned(),
        role,
        color,
    };
    directory.create(&account, Some(password_hash)).await?;

    tracing::info!(
        "Account created: {} ({}), role {}",
        account.key,
        account.name,
        account.role
    );
    Ok(())
}
