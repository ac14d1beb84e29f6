//! Typed repositories over the document store.
//!
//! The store speaks raw `serde_json::Value` documents; these repositories
//! convert to and from domain types and classify the failure modes.

pub mod directory;
pub mod ledger_store;

use thiserror::Error;

pub use directory::UserDirectory;
pub use ledger_store::LedgerStore;

use crate::store::StoreError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate user key).
    #[error("conflict: {0}")]
    Conflict(String),
}
