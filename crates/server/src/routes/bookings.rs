//! Booking route handlers.
//!
//! The year is addressed in the path; dates travel as `YYYY-MM-DD`
//! strings. Mutations resolve against the freshly loaded ledger on the
//! server, so a stale client can never make the decision.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use maison_core::{DayDate, RangeOutcome, ToggleOutcome, UserKey, Year, YearLedger};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::bookings::BookingService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Single-date toggle payload.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: DayDate,
    /// Admin-only: write the entry for this user instead.
    #[serde(default)]
    pub act_as: Option<UserKey>,
}

/// Shift-click range payload.
#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    /// The previously clicked date; decides the intent.
    pub anchor: DayDate,
    /// The shift-clicked date; order relative to the anchor is irrelevant.
    pub other: DayDate,
    #[serde(default)]
    pub act_as: Option<UserKey>,
}

/// Targeted removal payload.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub date: DayDate,
    /// Whose entry to remove.
    pub user: UserKey,
    /// Must be set when removing another user's entry.
    #[serde(default)]
    pub confirmed: bool,
}

/// Toggle response.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
    pub ledger: YearLedger,
}

/// Range response.
#[derive(Debug, Serialize)]
pub struct RangeResponse {
    #[serde(flatten)]
    pub outcome: RangeOutcome,
    pub ledger: YearLedger,
}

/// Build the bookings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings/{year}", get(ledger))
        .route("/bookings/{year}/toggle", post(toggle))
        .route("/bookings/{year}/range", post(range))
        .route("/bookings/{year}/remove", post(remove))
}

/// The full ledger document for a year.
///
/// GET /bookings/{year}
async fn ledger(
    State(state): State<AppState>,
    RequireUser(_current): RequireUser,
    Path(year): Path<i32>,
) -> Result<Json<YearLedger>> {
    let service = BookingService::new(state.store());
    let ledger = service.ledger(Year::new(year)).await?;
    Ok(Json(ledger))
}

/// Toggle one date for the acting user.
///
/// POST /bookings/{year}/toggle
async fn toggle(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(year): Path<i32>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let year = Year::new(year);
    let service = BookingService::new(state.store());

    let outcome = service
        .toggle(&current, payload.act_as.as_ref(), year, payload.date)
        .await?;
    let ledger = service.ledger(year).await?;

    Ok(Json(ToggleResponse { outcome, ledger }))
}

/// Apply a shift-click range gesture.
///
/// POST /bookings/{year}/range
async fn range(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(year): Path<i32>,
    Json(payload): Json<RangeRequest>,
) -> Result<Json<RangeResponse>> {
    let year = Year::new(year);
    let service = BookingService::new(state.store());

    let outcome = service
        .toggle_range(
            &current,
            payload.act_as.as_ref(),
            year,
            payload.anchor,
            payload.other,
        )
        .await?;
    let ledger = service.ledger(year).await?;

    Ok(Json(RangeResponse { outcome, ledger }))
}

/// Remove a specific user's entry from a date.
///
/// POST /bookings/{year}/remove
async fn remove(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(year): Path<i32>,
    Json(payload): Json<RemoveRequest>,
) -> Result<Json<serde_json::Value>> {
    let year = Year::new(year);
    let service = BookingService::new(state.store());

    let removed = service
        .remove(
            &current,
            year,
            payload.date,
            &payload.user,
            payload.confirmed,
        )
        .await?;

    Ok(Json(json!({ "removed": removed })))
}
