//! Real-time ledger updates over Server-Sent Events.
//!
//! Each event carries the complete ledger document for the watched year.
//! Clients replace their view wholesale on every event, which doubles as
//! the reconciliation mechanism after races or dropped events: the stream
//! opens with a snapshot, and a lagging subscriber just waits for the next
//! full document.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::warn;

use maison_core::{Year, YearLedger};

use crate::db::LedgerStore;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;
use crate::store::LEDGER_DOC_ID;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/bookings/{year}/watch", get(watch))
}

/// Stream ledger snapshots for a year.
///
/// GET /bookings/{year}/watch
async fn watch(
    State(state): State<AppState>,
    RequireUser(_current): RequireUser,
    Path(year): Path<i32>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let year = Year::new(year);
    let ledgers = LedgerStore::new(state.store());

    // Subscribe before reading the snapshot so a write in between is not
    // lost between the initial event and the feed.
    let feed = ledgers.watch(year).await;
    let snapshot = ledgers.load(year).await?;

    let initial = tokio_stream::once(ledger_event(&snapshot));
    let updates = BroadcastStream::new(feed).filter_map(move |event| match event {
        Ok(change) if change.id == LEDGER_DOC_ID => {
            decode_ledger_change(year, change.doc).map(|ledger| ledger_event(&ledger))
        }
        // Lagged subscribers pick the state up from the next event.
        _ => None,
    });

    let stream = initial.chain(updates);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Decode the document state carried by a change event.
///
/// A deleted document means the year really is empty; a document that no
/// longer parses as a ledger is dropped so watchers keep their last good
/// snapshot instead of seeing a falsely empty calendar.
fn decode_ledger_change(year: Year, doc: Option<serde_json::Value>) -> Option<YearLedger> {
    match doc {
        None => Some(YearLedger::new()),
        Some(doc) => match serde_json::from_value(doc) {
            Ok(ledger) => Some(ledger),
            Err(e) => {
                warn!(error = %e, %year, "dropping malformed ledger document from change feed");
                None
            }
        },
    }
}

/// Render one full-ledger SSE event.
fn ledger_event(ledger: &YearLedger) -> std::result::Result<Event, Infallible> {
    let event = match Event::default().event("ledger").json_data(ledger) {
        Ok(event) => event,
        Err(_) => Event::default().event("ledger").data("{}"),
    };
    Ok(event)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_valid_ledger_document() {
        let doc = json!({
            "2026-07-15": [{ "status": "booked", "name": "Me", "user": "me" }]
        });
        let ledger = decode_ledger_change(Year::new(2026), Some(doc)).unwrap();
        assert_eq!(ledger.date_count(), 1);
    }

    #[test]
    fn test_decode_deleted_document_is_empty_year() {
        let ledger = decode_ledger_change(Year::new(2026), None).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_malformed_document_is_dropped_not_emptied() {
        let doc = json!({ "2026-07-15": "not a list of entries" });
        assert!(decode_ledger_change(Year::new(2026), Some(doc)).is_none());
    }
}
