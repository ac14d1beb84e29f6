//! Administrative operations: directory management and bulk ledger edits.
//!
//! Routes gate these behind an admin session; the service enforces the
//! destructive-operation contract (explicit confirmation) itself so no
//! other caller can skip it.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use maison_core::{DateRange, DayDate, DisplayColor, Role, UserKey, Year, YearLedger};

use crate::db::{LedgerStore, RepositoryError, directory::UserDirectory};
use crate::models::User;
use crate::store::MemoryStore;

/// Errors from administrative operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// A destructive operation was not confirmed.
    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    /// A referenced user does not exist.
    #[error("unknown user: {0}")]
    UnknownUser(UserKey),

    /// A date range does not fall inside the addressed year.
    #[error("range {start}..{end} is outside year {year}")]
    RangeOutOfYear {
        /// Range start.
        start: DayDate,
        /// Range end.
        end: DayDate,
        /// Year the request addressed.
        year: Year,
    },

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One historical stay to import: an inclusive date range booked for one
/// user.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalRange {
    /// First night of the stay.
    pub start: DayDate,
    /// Last night of the stay, inclusive.
    pub end: DayDate,
    /// Who stayed.
    pub user: UserKey,
}

/// Administrative service.
pub struct AdminService<'a> {
    store: &'a MemoryStore,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// All directory users, in key order.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` on store failures.
    pub async fn list_users(&self) -> Result<Vec<User>, AdminError> {
        Ok(UserDirectory::new(self.store).list().await?)
    }

    /// Create a directory user.
    ///
    /// When no color is given one is assigned from the palette, indexed by
    /// the current directory size so household members get distinct colors.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` with a conflict if the key is
    /// already taken.
    pub async fn create_user(
        &self,
        key: UserKey,
        name: String,
        role: Role,
        color: Option<DisplayColor>,
    ) -> Result<User, AdminError> {
        let directory = UserDirectory::new(self.store);

        let color = match color {
            Some(color) => color,
            None => DisplayColor::from_palette(directory.list().await?.len()),
        };

        let user = User {
            key,
            name,
            role,
            color,
        };
        directory.create(&user, None).await?;
        info!(user = %user.key, role = %user.role, "created directory user");
        Ok(user)
    }

    /// Update a user's profile fields. `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownUser` if the key is not in the directory.
    pub async fn update_user(
        &self,
        key: &UserKey,
        name: Option<&str>,
        role: Option<Role>,
        color: Option<&DisplayColor>,
    ) -> Result<User, AdminError> {
        let directory = UserDirectory::new(self.store);
        directory
            .update_profile(key, name, role, color)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AdminError::UnknownUser(key.clone()),
                other => AdminError::Repository(other),
            })?;
        directory
            .get(key)
            .await?
            .ok_or_else(|| AdminError::UnknownUser(key.clone()))
    }

    /// Delete a directory user.
    ///
    /// Their existing ledger entries are denormalized snapshots and stay in
    /// place; only future logins and bookings are cut off.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::UnknownUser` if the key is not in the directory.
    pub async fn delete_user(&self, key: &UserKey) -> Result<(), AdminError> {
        let existed = UserDirectory::new(self.store).delete(key).await?;
        if !existed {
            return Err(AdminError::UnknownUser(key.clone()));
        }
        info!(user = %key, "deleted directory user");
        Ok(())
    }

    /// Bulk-import historical stays, replacing the year's ledger wholesale.
    ///
    /// This is the data-migration path: the expanded ranges become the
    /// year's entire ledger, destroying whatever was there. Entries are
    /// booked with each user's current directory name. Validation happens
    /// before the single save, so a failing range leaves the old ledger in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ConfirmationRequired` unless `confirmed` is
    /// set, `AdminError::UnknownUser` for a range whose user is not in the
    /// directory, and `AdminError::RangeOutOfYear` for a range that does
    /// not fit in the year.
    pub async fn import_history(
        &self,
        year: Year,
        ranges: &[HistoricalRange],
        confirmed: bool,
    ) -> Result<usize, AdminError> {
        let directory = UserDirectory::new(self.store);
        let ledgers = LedgerStore::new(self.store);

        if !confirmed {
            let existing = ledgers.load(year).await?.date_count();
            return Err(AdminError::ConfirmationRequired(format!(
                "importing into {year} replaces its ledger ({existing} dates currently booked)"
            )));
        }

        let mut ledger = YearLedger::new();
        let mut booked = 0;
        for range in ranges {
            if !year.contains(range.start) || !year.contains(range.end) {
                return Err(AdminError::RangeOutOfYear {
                    start: range.start,
                    end: range.end,
                    year,
                });
            }

            let user = directory
                .get(&range.user)
                .await?
                .ok_or_else(|| AdminError::UnknownUser(range.user.clone()))?;
            let actor = user.user_ref();

            for date in DateRange::inclusive(range.start, range.end).days() {
                ledger.book(date, &actor);
                booked += 1;
            }
        }

        ledgers.save(year, &ledger).await?;
        info!(%year, ranges = ranges.len(), booked, "imported historical stays");
        Ok(booked)
    }

    /// Erase a year's ledger entirely.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ConfirmationRequired` unless `confirmed` is
    /// set. The message names exactly what would be lost.
    pub async fn clear_year(&self, year: Year, confirmed: bool) -> Result<usize, AdminError> {
        let ledgers = LedgerStore::new(self.store);
        let mut ledger = ledgers.load(year).await?;
        let dates = ledger.date_count();

        if !confirmed {
            return Err(AdminError::ConfirmationRequired(format!(
                "clearing {year} deletes reservations on {dates} dates"
            )));
        }

        ledger.clear();
        ledgers.save(year, &ledger).await?;
        info!(%year, dates, "cleared year ledger");
        Ok(dates)
    }

    /// The ledger for a year, for admin inspection.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` on store failures.
    pub async fn year_ledger(&self, year: Year) -> Result<YearLedger, AdminError> {
        Ok(LedgerStore::new(self.store).load(year).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maison_core::PALETTE;

    fn key(s: &str) -> UserKey {
        UserKey::parse(s).unwrap()
    }

    fn date(s: &str) -> DayDate {
        DayDate::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_assigns_palette_colors() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);

        let first = admin
            .create_user(key("me"), "Me".into(), Role::User, None)
            .await
            .unwrap();
        let second = admin
            .create_user(key("sarah"), "Sarah".into(), Role::User, None)
            .await
            .unwrap();

        assert_eq!(first.color.as_str(), PALETTE[0]);
        assert_eq!(second.color.as_str(), PALETTE[1]);
    }

    #[tokio::test]
    async fn test_update_user_role() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        admin
            .create_user(key("me"), "Me".into(), Role::User, None)
            .await
            .unwrap();

        let updated = admin
            .update_user(&key("me"), None, Some(Role::Admin), None)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.name, "Me");
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);

        let result = admin.update_user(&key("ghost"), Some("Ghost"), None, None).await;
        assert!(matches!(result, Err(AdminError::UnknownUser(_))));
    }

    #[tokio::test]
    async fn test_delete_user_keeps_ledger_entries() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        let year = Year::new(2026);

        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();
        admin
            .import_history(
                year,
                &[HistoricalRange {
                    start: date("2026-07-15"),
                    end: date("2026-07-15"),
                    user: key("jean"),
                }],
                true,
            )
            .await
            .unwrap();

        admin.delete_user(&key("jean")).await.unwrap();

        let ledger = admin.year_ledger(year).await.unwrap();
        assert_eq!(ledger.entries(date("2026-07-15"))[0].name, "Uncle Jean");
    }

    #[tokio::test]
    async fn test_import_history() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        let year = Year::new(2026);

        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();
        admin
            .create_user(key("sarah"), "Sarah".into(), Role::User, None)
            .await
            .unwrap();

        let booked = admin
            .import_history(
                year,
                &[
                    HistoricalRange {
                        start: date("2026-07-15"),
                        end: date("2026-07-17"),
                        user: key("jean"),
                    },
                    HistoricalRange {
                        start: date("2026-08-01"),
                        end: date("2026-08-02"),
                        user: key("sarah"),
                    },
                ],
                true,
            )
            .await
            .unwrap();

        assert_eq!(booked, 5);
        let ledger = admin.year_ledger(year).await.unwrap();
        assert_eq!(ledger.date_count(), 5);
        assert_eq!(ledger.entries(date("2026-07-16"))[0].name, "Uncle Jean");
    }

    #[tokio::test]
    async fn test_import_requires_confirmation() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);

        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();

        let result = admin
            .import_history(
                Year::new(2026),
                &[HistoricalRange {
                    start: date("2026-07-15"),
                    end: date("2026-07-15"),
                    user: key("jean"),
                }],
                false,
            )
            .await;
        assert!(matches!(result, Err(AdminError::ConfirmationRequired(_))));
    }

    #[tokio::test]
    async fn test_import_replaces_existing_ledger() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        let year = Year::new(2026);

        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();
        admin
            .import_history(
                year,
                &[HistoricalRange {
                    start: date("2026-03-01"),
                    end: date("2026-03-05"),
                    user: key("jean"),
                }],
                true,
            )
            .await
            .unwrap();

        // A second import does not merge: the March stays are gone.
        admin
            .import_history(
                year,
                &[HistoricalRange {
                    start: date("2026-07-15"),
                    end: date("2026-07-15"),
                    user: key("jean"),
                }],
                true,
            )
            .await
            .unwrap();

        let ledger = admin.year_ledger(year).await.unwrap();
        assert_eq!(ledger.date_count(), 1);
        assert!(ledger.entries(date("2026-03-01")).is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_unknown_user_without_writing() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        let year = Year::new(2026);
        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();

        let result = admin
            .import_history(
                year,
                &[
                    HistoricalRange {
                        start: date("2026-07-15"),
                        end: date("2026-07-17"),
                        user: key("jean"),
                    },
                    HistoricalRange {
                        start: date("2026-08-01"),
                        end: date("2026-08-02"),
                        user: key("ghost"),
                    },
                ],
                true,
            )
            .await;

        assert!(matches!(result, Err(AdminError::UnknownUser(_))));
        assert!(admin.year_ledger(year).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_range_outside_year() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        admin
            .create_user(key("jean"), "Uncle Jean".into(), Role::User, None)
            .await
            .unwrap();

        let result = admin
            .import_history(
                Year::new(2026),
                &[HistoricalRange {
                    start: date("2026-12-30"),
                    end: date("2027-01-02"),
                    user: key("jean"),
                }],
                true,
            )
            .await;
        assert!(matches!(result, Err(AdminError::RangeOutOfYear { .. })));
    }

    #[tokio::test]
    async fn test_clear_year_requires_confirmation() {
        let store = MemoryStore::new();
        let admin = AdminService::new(&store);
        let year = Year::new(2026);

        admin
            .create_user(key("me"), "Me".into(), Role::User, None)
            .await
            .unwrap();
        admin
            .import_history(
                year,
                &[HistoricalRange {
                    start: date("2026-07-15"),
                    end: date("2026-07-16"),
                    user: key("me"),
                }],
                true,
            )
            .await
            .unwrap();

        let result = admin.clear_year(year, false).await;
        assert!(matches!(result, Err(AdminError::ConfirmationRequired(_))));
        assert_eq!(admin.year_ledger(year).await.unwrap().date_count(), 2);

        let cleared = admin.clear_year(year, true).await.unwrap();
        assert_eq!(cleared, 2);
        assert!(admin.year_ledger(year).await.unwrap().is_empty());
    }
}
