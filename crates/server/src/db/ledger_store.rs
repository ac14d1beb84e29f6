//! Booking ledger repository.
//!
//! Each year's ledger is one document (`bookings/<year>/days`) read and
//! written whole. There is no partial update path on purpose: the mutation
//! protocol is read-modify-write with last-write-wins.

use maison_core::{Year, YearLedger};
use tokio::sync::broadcast;

use super::RepositoryError;
use crate::store::{ChangeEvent, LEDGER_DOC_ID, MemoryStore};

/// Repository for per-year ledger documents.
pub struct LedgerStore<'a> {
    store: &'a MemoryStore,
}

impl<'a> LedgerStore<'a> {
    /// Create a new ledger repository.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Load a year's ledger. A missing document is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document
    /// does not deserialize as a ledger.
    pub async fn load(&self, year: Year) -> Result<YearLedger, RepositoryError> {
        match self
            .store
            .get(&year.bookings_collection(), LEDGER_DOC_ID)
            .await
        {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid ledger for {year}: {e}"))
            }),
            None => Ok(YearLedger::new()),
        }
    }

    /// Persist a year's ledger as one full-document overwrite.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if persistence fails. The caller
    /// surfaces this to the user; no retry, no rollback bookkeeping.
    pub async fn save(&self, year: Year, ledger: &YearLedger) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(ledger).map_err(crate::store::StoreError::from)?;
        self.store
            .set(&year.bookings_collection(), LEDGER_DOC_ID, value)
            .await?;
        Ok(())
    }

    /// Subscribe to changes of a year's ledger document.
    pub async fn watch(&self, year: Year) -> broadcast::Receiver<ChangeEvent> {
        self.store.watch(&year.bookings_collection()).await
    }
}
