//! Notification outbox.
//!
//! Booking changes are announced to the household by appending a message
//! document to the `mail_queue` collection. A separate delivery process
//! drains the queue; this service only enqueues. Enqueue failures are
//! logged and swallowed by the caller: a lost notification must never
//! fail a booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maison_core::{LedgerDiff, UserKey, Year};

use crate::store::{MAIL_QUEUE_COLLECTION, MemoryStore, StoreError};

/// A queued notification message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Who made the change.
    pub actor: UserKey,
    /// When the message was queued.
    pub created_at: DateTime<Utc>,
}

/// Notification outbox service.
pub struct OutboxService<'a> {
    store: &'a MemoryStore,
}

impl<'a> OutboxService<'a> {
    /// Create a new outbox service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Queue a notification describing a ledger change. Returns the
    /// generated message id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the message cannot be persisted.
    pub async fn notify_booking_change(
        &self,
        actor: &UserKey,
        actor_name: &str,
        year: Year,
        diff: &LedgerDiff,
    ) -> Result<String, StoreError> {
        let message = MailMessage {
            subject: format!("Calendar update for {year}"),
            body: render_body(actor_name, diff),
            actor: actor.clone(),
            created_at: Utc::now(),
        };

        let doc = serde_json::to_value(&message)?;
        self.store.add(MAIL_QUEUE_COLLECTION, doc).await
    }

    /// All queued messages, oldest-id first.
    pub async fn pending(&self) -> Vec<(String, serde_json::Value)> {
        self.store.list(MAIL_QUEUE_COLLECTION).await
    }
}

/// Render the notification body from a diff.
fn render_body(actor_name: &str, diff: &LedgerDiff) -> String {
    let mut lines = Vec::new();

    if !diff.added.is_empty() {
        let dates: Vec<String> = diff.added.iter().map(ToString::to_string).collect();
        lines.push(format!("{actor_name} booked: {}", dates.join(", ")));
    }
    if !diff.removed.is_empty() {
        let dates: Vec<String> = diff.removed.iter().map(ToString::to_string).collect();
        lines.push(format!("{actor_name} released: {}", dates.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maison_core::DayDate;

    #[tokio::test]
    async fn test_notify_queues_message() {
        let store = MemoryStore::new();
        let outbox = OutboxService::new(&store);

        let diff = LedgerDiff {
            added: vec![DayDate::parse("2026-07-15").unwrap()],
            removed: vec![],
        };
        let actor = UserKey::parse("me").unwrap();
        outbox
            .notify_booking_change(&actor, "Me", Year::new(2026), &diff)
            .await
            .unwrap();

        let pending = outbox.pending().await;
        assert_eq!(pending.len(), 1);
        let message: MailMessage = serde_json::from_value(pending[0].1.clone()).unwrap();
        assert_eq!(message.subject, "Calendar update for 2026");
        assert!(message.body.contains("Me booked: 2026-07-15"));
    }

    #[test]
    fn test_render_body_both_directions() {
        let diff = LedgerDiff {
            added: vec![DayDate::parse("2026-07-15").unwrap()],
            removed: vec![
                DayDate::parse("2026-07-16").unwrap(),
                DayDate::parse("2026-07-17").unwrap(),
            ],
        };
        let body = render_body("Sarah", &diff);
        assert_eq!(
            body,
            "Sarah booked: 2026-07-15\nSarah released: 2026-07-16, 2026-07-17"
        );
    }
}
