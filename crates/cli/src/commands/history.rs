//! Bulk ledger commands.
//!
//! # Usage
//!
//! ```bash
//! # stays.json: [{"start": "2026-07-15", "end": "2026-07-17", "user": "parents"}, ...]
//! maison-cli history import --year 2026 --file stays.json
//!
//! maison-cli history clear --year 2026 --yes
//! ```

use std::path::Path;

use thiserror::Error;

use maison_core::Year;
use maison_server::services::admin::{AdminService, HistoricalRange};

use super::CliError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Store access failed.
    #[error(transparent)]
    Cli(#[from] CliError),

    /// The stays file could not be read.
    #[error("Cannot read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// The stays file is not valid JSON.
    #[error("Invalid stays file: {0}")]
    ParseFile(#[from] serde_json::Error),

    /// The admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] maison_server::services::admin::AdminError),
}

/// Import historical stays from a JSON file, replacing the year's ledger.
/// Requires `--yes`.
pub async fn import(year: i32, file: &Path, yes: bool) -> Result<(), HistoryError> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| HistoryError::ReadFile {
            path: file.display().to_string(),
            source,
        })?;
    let ranges: Vec<HistoricalRange> = serde_json::from_slice(&bytes)?;

    let store = super::open_store().await?;
    let booked = AdminService::new(&store)
        .import_history(Year::new(year), &ranges, yes)
        .await?;

    tracing::info!("Imported {} ranges, {booked} nights booked", ranges.len());
    Ok(())
}

/// Erase a year's ledger. Requires `--yes`.
pub async fn clear(year: i32, yes: bool) -> Result<(), HistoryError> {
    let store = super::open_store().await?;
    let cleared = AdminService::new(&store)
        .clear_year(Year::new(year), yes)
        .await?;

    tracing::info!("Cleared {cleared} dates from {year}");
    Ok(())
}
