//! Store seeding commands.

use thiserror::Error;

use maison_server::seed;

use super::CliError;

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Store access failed.
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Directory operation failed.
    #[error("Directory error: {0}")]
    Directory(#[from] maison_server::db::RepositoryError),
}

/// Create any missing initial household users.
pub async fn users() -> Result<(), SeedError> {
    let store = super::open_store().await?;
    let created = seed::seed_users(&store).await?;
    tracing::info!("Seed complete: {created} users created");
    Ok(())
}
