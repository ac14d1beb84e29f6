//! Calendar view route.
//!
//! Serves the render-ready year view: twelve Sunday-first month grids plus
//! the display colors for every booked date, resolved against the current
//! directory (deleted users fall back to grey).

use std::collections::{BTreeMap, HashMap};

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use maison_core::calendar::{self, MonthGrid};
use maison_core::{DayDate, DisplayColor, UserKey, Year};

use crate::db::directory::UserDirectory;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::bookings::BookingService;
use crate::state::AppState;

/// Render-ready year view.
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: Year,
    pub months: Vec<MonthGrid>,
    /// Booked dates and the colors of their reservations, in entry order.
    pub days: BTreeMap<DayDate, Vec<DisplayColor>>,
}

/// Build the calendar router.
pub fn router() -> Router<AppState> {
    Router::new().route("/calendar/{year}", get(year_view))
}

/// The annual calendar view for a year.
///
/// GET /calendar/{year}
async fn year_view(
    State(state): State<AppState>,
    RequireUser(_current): RequireUser,
    Path(year): Path<i32>,
) -> Result<Json<CalendarResponse>> {
    let year = Year::new(year);
    let ledger = BookingService::new(state.store()).ledger(year).await?;

    let palette: HashMap<UserKey, DisplayColor> = UserDirectory::new(state.store())
        .list()
        .await?
        .into_iter()
        .map(|u| (u.key, u.color))
        .collect();

    let days = ledger
        .iter()
        .map(|(date, entries)| {
            let colors = calendar::day_colors(entries, |key| palette.get(key).cloned());
            (date, colors)
        })
        .collect();

    Ok(Json(CalendarResponse {
        year,
        months: calendar::year_grids(year),
        days,
    }))
}
