//! Booking service.
//!
//! All ledger mutations go through here: the service resolves the acting
//! identity, enforces capabilities, applies the pure ledger operation, and
//! writes the year document back whole. Capability checks live at this
//! boundary, not in any client.
//!
//! Administrators may act on behalf of another user (booking for a family
//! member who never logs in). Removing someone else's reservation is an
//! admin override and must be explicitly confirmed; it is never silent.

use thiserror::Error;
use tracing::warn;

use maison_core::{DayDate, RangeOutcome, ToggleOutcome, UserKey, UserRef, Year, YearLedger};

use crate::db::{LedgerStore, RepositoryError, directory::UserDirectory};
use crate::models::{CurrentUser, User};
use crate::services::outbox::OutboxService;
use crate::store::MemoryStore;

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The acting user may not perform this mutation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The date does not belong to the addressed year.
    #[error("date {date} is outside year {year}")]
    OutOfYear {
        /// Offending date.
        date: DayDate,
        /// Year the request addressed.
        year: Year,
    },

    /// The target user does not exist in the directory.
    #[error("unknown user: {0}")]
    UnknownUser(UserKey),

    /// An admin override needs explicit confirmation before it is applied.
    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Booking service.
pub struct BookingService<'a> {
    store: &'a MemoryStore,
}

impl<'a> BookingService<'a> {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// The full ledger for a year.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Repository` if the ledger cannot be loaded.
    pub async fn ledger(&self, year: Year) -> Result<YearLedger, BookingError> {
        Ok(LedgerStore::new(self.store).load(year).await?)
    }

    /// Toggle the acting user's reservation on one date.
    ///
    /// `act_as` lets an administrator write entries for another user.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Forbidden` if the user may not book,
    /// `BookingError::OutOfYear` if the date is outside the year, and
    /// `BookingError::Repository` on persistence failures.
    pub async fn toggle(
        &self,
        current: &CurrentUser,
        act_as: Option<&UserKey>,
        year: Year,
        date: DayDate,
    ) -> Result<ToggleOutcome, BookingError> {
        check_in_year(year, date)?;
        let (caller, target) = self.resolve_actor(current, act_as).await?;

        let ledgers = LedgerStore::new(self.store);
        let mut ledger = ledgers.load(year).await?;
        let before = ledger.clone();

        let outcome = ledger.toggle(date, &target);
        ledgers.save(year, &ledger).await?;

        self.announce(&caller, &target, year, &ledger, &before).await;
        Ok(outcome)
    }

    /// Apply a shift-click range gesture for the acting user.
    ///
    /// The intent (book everything / release everything) is decided from
    /// the anchor date on the server, against the freshly loaded ledger.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Self::toggle`].
    pub async fn toggle_range(
        &self,
        current: &CurrentUser,
        act_as: Option<&UserKey>,
        year: Year,
        anchor: DayDate,
        other: DayDate,
    ) -> Result<RangeOutcome, BookingError> {
        check_in_year(year, anchor)?;
        check_in_year(year, other)?;
        let (caller, target) = self.resolve_actor(current, act_as).await?;

        let ledgers = LedgerStore::new(self.store);
        let mut ledger = ledgers.load(year).await?;
        let before = ledger.clone();

        let outcome = ledger.toggle_range(anchor, other, &target);
        if !outcome.changed.is_empty() {
            ledgers.save(year, &ledger).await?;
        }

        self.announce(&caller, &target, year, &ledger, &before).await;
        Ok(outcome)
    }

    /// Remove a specific user's reservation from a date.
    ///
    /// Users may always release their own dates. Removing someone else's
    /// reservation requires an admin role and `confirmed = true`; without
    /// confirmation the request fails with the exact consequence spelled
    /// out, so the client can ask.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Forbidden`, `BookingError::ConfirmationRequired`,
    /// `BookingError::OutOfYear`, or `BookingError::Repository`.
    pub async fn remove(
        &self,
        current: &CurrentUser,
        year: Year,
        date: DayDate,
        target: &UserKey,
        confirmed: bool,
    ) -> Result<bool, BookingError> {
        check_in_year(year, date)?;
        let caller = self.acting_user(current).await?;

        if target != &caller.key {
            if !caller.role.is_admin() {
                return Err(BookingError::Forbidden(
                    "only administrators may remove another user's reservation".to_owned(),
                ));
            }
            if !confirmed {
                return Err(BookingError::ConfirmationRequired(format!(
                    "remove {target}'s reservation on {date}"
                )));
            }
        }

        let ledgers = LedgerStore::new(self.store);
        let mut ledger = ledgers.load(year).await?;
        let before = ledger.clone();

        let removed = ledger.remove_entry(date, target);
        if removed {
            ledgers.save(year, &ledger).await?;
            let target_ref = UserRef::new(target.clone(), String::new());
            self.announce(&caller, &target_ref, year, &ledger, &before)
                .await;
        }

        Ok(removed)
    }

    /// Load the caller's directory account and check it may book.
    async fn acting_user(&self, current: &CurrentUser) -> Result<User, BookingError> {
        let directory = UserDirectory::new(self.store);
        let caller = directory
            .get(&current.key)
            .await?
            .ok_or_else(|| BookingError::UnknownUser(current.key.clone()))?;

        if !caller.role.may_book() {
            return Err(BookingError::Forbidden(
                "guests may not modify bookings".to_owned(),
            ));
        }

        Ok(caller)
    }

    /// Resolve the caller and the identity entries are written under.
    ///
    /// Roles come from the directory, not the session snapshot, so a
    /// demotion takes effect on the next mutation.
    async fn resolve_actor(
        &self,
        current: &CurrentUser,
        act_as: Option<&UserKey>,
    ) -> Result<(User, UserRef), BookingError> {
        let caller = self.acting_user(current).await?;

        let target = match act_as {
            Some(key) if key != &caller.key => {
                if !caller.role.is_admin() {
                    return Err(BookingError::Forbidden(
                        "only administrators may book on behalf of others".to_owned(),
                    ));
                }
                let directory = UserDirectory::new(self.store);
                directory
                    .get(key)
                    .await?
                    .ok_or_else(|| BookingError::UnknownUser(key.clone()))?
                    .user_ref()
            }
            _ => caller.user_ref(),
        };

        Ok((caller, target))
    }

    /// Queue a change notification. Failures are logged, never surfaced:
    /// the booking already succeeded.
    async fn announce(
        &self,
        caller: &User,
        target: &UserRef,
        year: Year,
        after: &YearLedger,
        before: &YearLedger,
    ) {
        let diff = after.diff_since(before, &target.key);
        if diff.is_empty() {
            return;
        }

        let outbox = OutboxService::new(self.store);
        if let Err(e) = outbox
            .notify_booking_change(&caller.key, &caller.name, year, &diff)
            .await
        {
            warn!(error = %e, %year, "failed to queue booking notification");
        }
    }
}

/// Reject dates that fall outside the addressed year document.
fn check_in_year(year: Year, date: DayDate) -> Result<(), BookingError> {
    if year.contains(date) {
        Ok(())
    } else {
        Err(BookingError::OutOfYear { date, year })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maison_core::{DisplayColor, RangeIntent, Role};
    use serde_json::Value;

    use crate::store::MAIL_QUEUE_COLLECTION;

    async fn seed_user(store: &MemoryStore, key: &str, name: &str, role: Role) -> CurrentUser {
        let directory = UserDirectory::new(store);
        let user = User {
            key: UserKey::parse(key).unwrap(),
            name: name.to_owned(),
            role,
            color: DisplayColor::fallback(),
        };
        directory.create(&user, None).await.unwrap();
        CurrentUser::from(&user)
    }

    fn date(s: &str) -> DayDate {
        DayDate::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_books_and_releases() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        let outcome = service
            .toggle(&me, None, year, date("2026-07-15"))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);

        let ledger = service.ledger(year).await.unwrap();
        assert_eq!(ledger.entries(date("2026-07-15"))[0].name, "Me");

        let outcome = service
            .toggle(&me, None, year, date("2026-07-15"))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert!(service.ledger(year).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_may_not_book() {
        let store = MemoryStore::new();
        let guest = seed_user(&store, "visitor", "Visitor", Role::Guest).await;
        let service = BookingService::new(&store);

        let result = service
            .toggle(&guest, None, Year::new(2026), date("2026-07-15"))
            .await;
        assert!(matches!(result, Err(BookingError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_toggle_rejects_date_outside_year() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);

        let result = service
            .toggle(&me, None, Year::new(2025), date("2026-07-15"))
            .await;
        assert!(matches!(result, Err(BookingError::OutOfYear { .. })));
    }

    #[tokio::test]
    async fn test_act_as_requires_admin() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        seed_user(&store, "sarah", "Sarah", Role::User).await;
        let service = BookingService::new(&store);

        let sarah_key = UserKey::parse("sarah").unwrap();
        let result = service
            .toggle(&me, Some(&sarah_key), Year::new(2026), date("2026-07-15"))
            .await;
        assert!(matches!(result, Err(BookingError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_books_on_behalf() {
        let store = MemoryStore::new();
        let admin = seed_user(&store, "admin", "Admin", Role::Admin).await;
        seed_user(&store, "jean", "Uncle Jean", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        let jean_key = UserKey::parse("jean").unwrap();
        service
            .toggle(&admin, Some(&jean_key), year, date("2026-07-15"))
            .await
            .unwrap();

        // The entry belongs to Jean, not the admin.
        let ledger = service.ledger(year).await.unwrap();
        let entry = &ledger.entries(date("2026-07-15"))[0];
        assert_eq!(entry.user, jean_key);
        assert_eq!(entry.name, "Uncle Jean");
    }

    #[tokio::test]
    async fn test_range_intent_from_anchor() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        let outcome = service
            .toggle_range(&me, None, year, date("2026-07-01"), date("2026-07-03"))
            .await
            .unwrap();
        assert_eq!(outcome.intent, RangeIntent::Add);
        assert_eq!(outcome.changed.len(), 3);

        // Anchor now held, so the same gesture releases the range.
        let outcome = service
            .toggle_range(&me, None, year, date("2026-07-01"), date("2026-07-03"))
            .await
            .unwrap();
        assert_eq!(outcome.intent, RangeIntent::Remove);
        assert!(service.ledger(year).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_range_add_stores_one_entry_per_date() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        service
            .toggle_range(&me, None, year, date("2026-07-01"), date("2026-07-03"))
            .await
            .unwrap();

        let ledger = service.ledger(year).await.unwrap();
        for day in ["2026-07-01", "2026-07-02", "2026-07-03"] {
            assert_eq!(ledger.entries(date(day)).len(), 1);
        }
    }

    #[tokio::test]
    async fn test_remove_own_entry_needs_no_confirmation() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        service.toggle(&me, None, year, date("2026-07-15")).await.unwrap();
        let removed = service
            .remove(&me, year, date("2026-07-15"), &me.key, false)
            .await
            .unwrap();
        assert!(removed);
    }

    #[tokio::test]
    async fn test_remove_other_entry_requires_admin_and_confirmation() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let admin = seed_user(&store, "admin", "Admin", Role::Admin).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        service.toggle(&me, None, year, date("2026-07-15")).await.unwrap();

        // Even an admin must confirm before touching someone else's entry.
        let result = service
            .remove(&admin, year, date("2026-07-15"), &me.key, false)
            .await;
        assert!(matches!(result, Err(BookingError::ConfirmationRequired(_))));

        let other = seed_user(&store, "sarah", "Sarah", Role::User).await;
        let result = service
            .remove(&other, year, date("2026-07-15"), &me.key, true)
            .await;
        assert!(matches!(result, Err(BookingError::Forbidden(_))));

        // Confirmed admin override goes through.
        let removed = service
            .remove(&admin, year, date("2026-07-15"), &me.key, true)
            .await
            .unwrap();
        assert!(removed);
    }

    #[tokio::test]
    async fn test_mutations_queue_notifications() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);

        service
            .toggle(&me, None, Year::new(2026), date("2026-07-15"))
            .await
            .unwrap();

        let queued = store.list(MAIL_QUEUE_COLLECTION).await;
        assert_eq!(queued.len(), 1);
        let body = queued[0].1.get("body").and_then(Value::as_str).unwrap();
        assert!(body.contains("Me booked: 2026-07-15"));
    }

    #[tokio::test]
    async fn test_no_op_remove_queues_nothing() {
        let store = MemoryStore::new();
        let me = seed_user(&store, "me", "Me", Role::User).await;
        let service = BookingService::new(&store);
        let year = Year::new(2026);

        let removed = service
            .remove(&me, year, date("2026-07-15"), &me.key, false)
            .await
            .unwrap();

        assert!(!removed);
        assert!(store.list(MAIL_QUEUE_COLLECTION).await.is_empty());
    }
}
