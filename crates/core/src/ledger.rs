//! The per-year booking ledger and its merge rules.
//!
//! A ledger maps calendar dates to the list of reservations on that date,
//! in insertion order, with at most one entry per user per date. The whole
//! year is stored and overwritten as one document; the representation is
//! sparse (a date with no reservations has no key).
//!
//! Mutations are expressed as pure operations on the in-memory map; the
//! server reads the year document, applies one operation, and writes the
//! full map back. Concurrent writers race last-write-wins by design.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DateRange, DayDate, UserKey};

/// Reservation status. Only one state exists today; the enum keeps the
/// document field explicit ("status": "booked") and leaves room for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Booked,
}

/// One reservation on one date.
///
/// The owner reference is a denormalized snapshot (display name + key) taken
/// at write time: deleting the user later never rewrites existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationEntry {
    /// Reservation status.
    pub status: BookingStatus,
    /// Owner display name at the time of booking.
    pub name: String,
    /// Owner identifier; the match key for all ledger operations.
    pub user: UserKey,
}

/// The acting user of a mutation: the identity on whose behalf entries are
/// written (possibly an impersonated one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// User identifier.
    pub key: UserKey,
    /// Display name, denormalized into new entries.
    pub name: String,
}

impl UserRef {
    /// Create a new acting-user reference.
    #[must_use]
    pub const fn new(key: UserKey, name: String) -> Self {
        Self { key, name }
    }

    /// Build the reservation entry this user writes.
    #[must_use]
    pub fn entry(&self) -> ReservationEntry {
        ReservationEntry {
            status: BookingStatus::Booked,
            name: self.name.clone(),
            user: self.key.clone(),
        }
    }
}

/// Result of a single-date toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The acting user now has an entry on the date.
    Added,
    /// The acting user's entry was removed from the date.
    Removed,
}

/// Intent of a range toggle, decided once from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeIntent {
    /// Book every date in the range the user does not already hold.
    Add,
    /// Release every date in the range the user holds.
    Remove,
}

/// Result of a range toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeOutcome {
    /// The intent that was applied across the range.
    pub intent: RangeIntent,
    /// Dates whose entry list actually changed.
    pub changed: Vec<DayDate>,
}

/// Per-user difference between two ledger snapshots.
///
/// Feeds the notification side-channel: dates the user gained and lost in
/// one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LedgerDiff {
    /// Dates where the user now has an entry but previously did not.
    pub added: Vec<DayDate>,
    /// Dates where the user previously had an entry but no longer does.
    pub removed: Vec<DayDate>,
}

impl LedgerDiff {
    /// Whether the mutation changed nothing for this user.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// One year's booking ledger: date -> reservations, sparse and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct YearLedger(BTreeMap<DayDate, Vec<ReservationEntry>>);

impl YearLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Whether the ledger has no reservations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of dates carrying at least one reservation.
    #[must_use]
    pub fn date_count(&self) -> usize {
        self.0.len()
    }

    /// Reservations on a date, in insertion order. Empty slice if none.
    #[must_use]
    pub fn entries(&self, date: DayDate) -> &[ReservationEntry] {
        self.0.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Iterate over all dates and their reservations, in date order.
    pub fn iter(&self) -> impl Iterator<Item = (DayDate, &[ReservationEntry])> {
        self.0.iter().map(|(date, entries)| (*date, entries.as_slice()))
    }

    /// Whether `key` holds a reservation on `date`.
    #[must_use]
    pub fn has_booking(&self, date: DayDate, key: &UserKey) -> bool {
        self.entries(date).iter().any(|e| &e.user == key)
    }

    /// All dates on which `key` holds a reservation, ascending.
    #[must_use]
    pub fn dates_for(&self, key: &UserKey) -> Vec<DayDate> {
        self.0
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| &e.user == key))
            .map(|(date, _)| *date)
            .collect()
    }

    /// Toggle the acting user's reservation on a date.
    ///
    /// Removes the user's entry if present, otherwise appends one. A date
    /// whose entry list becomes empty loses its key entirely.
    pub fn toggle(&mut self, date: DayDate, actor: &UserRef) -> ToggleOutcome {
        if self.remove_entry(date, &actor.key) {
            ToggleOutcome::Removed
        } else {
            self.book(date, actor);
            ToggleOutcome::Added
        }
    }

    /// Ensure the acting user holds a reservation on a date.
    ///
    /// Find-and-replace: an existing entry for the same user is overwritten
    /// in place (refreshing the denormalized name), never duplicated.
    pub fn book(&mut self, date: DayDate, actor: &UserRef) {
        let entries = self.0.entry(date).or_default();
        if let Some(existing) = entries.iter_mut().find(|e| e.user == actor.key) {
            *existing = actor.entry();
        } else {
            entries.push(actor.entry());
        }
    }

    /// Remove `key`'s reservation from a date, if any.
    ///
    /// Returns whether an entry was removed. Drops the date key when its
    /// list becomes empty, keeping the representation sparse.
    pub fn remove_entry(&mut self, date: DayDate, key: &UserKey) -> bool {
        let Some(entries) = self.0.get_mut(&date) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| &e.user != key);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.0.remove(&date);
        }
        removed
    }

    /// Apply a shift-click range gesture.
    ///
    /// The intent is decided once from the anchor date: if the acting user
    /// already holds the anchor, every date in the inclusive range is
    /// released; otherwise every date is booked. Dates already matching the
    /// intent are left untouched, which makes the operation idempotent per
    /// date. Endpoint order does not matter.
    pub fn toggle_range(
        &mut self,
        anchor: DayDate,
        other: DayDate,
        actor: &UserRef,
    ) -> RangeOutcome {
        let intent = if self.has_booking(anchor, &actor.key) {
            RangeIntent::Remove
        } else {
            RangeIntent::Add
        };

        let mut changed = Vec::new();
        for date in DateRange::inclusive(anchor, other).days() {
            let touched = match intent {
                RangeIntent::Add => {
                    if self.has_booking(date, &actor.key) {
                        false
                    } else {
                        self.book(date, actor);
                        true
                    }
                }
                RangeIntent::Remove => self.remove_entry(date, &actor.key),
            };
            if touched {
                changed.push(date);
            }
        }

        RangeOutcome { intent, changed }
    }

    /// Remove every reservation in the ledger.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Dates `key` gained and lost relative to an earlier snapshot.
    #[must_use]
    pub fn diff_since(&self, before: &Self, key: &UserKey) -> LedgerDiff {
        let was: Vec<DayDate> = before.dates_for(key);
        let now: Vec<DayDate> = self.dates_for(key);

        LedgerDiff {
            added: now.iter().filter(|d| !was.contains(d)).copied().collect(),
            removed: was.iter().filter(|d| !now.contains(d)).copied().collect(),
        }
    }
}

impl FromIterator<(DayDate, Vec<ReservationEntry>)> for YearLedger {
    fn from_iter<T: IntoIterator<Item = (DayDate, Vec<ReservationEntry>)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .filter(|(_, entries)| !entries.is_empty())
                .collect(),
        )
    }
}
