//! CLI command implementations.

pub mod admin;
pub mod history;
pub mod seed;

use std::path::PathBuf;

use maison_server::store::MemoryStore;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Store snapshot could not be opened.
    #[error("Store error: {0}")]
    Store(#[from] maison_server::store::StoreError),
}

/// Open the store snapshot named by `MAISON_STORE_PATH`.
///
/// The CLI refuses to run against a memory-only store: every command here
/// exists to mutate the persistent snapshot.
pub async fn open_store() -> Result<MemoryStore, CliError> {
    dotenvy::dotenv().ok();

    let path = std::env::var("MAISON_STORE_PATH")
        .map(PathBuf::from)
        .map_err(|_| CliError::MissingEnvVar("MAISON_STORE_PATH"))?;

    Ok(MemoryStore::open(path).await?)
}
