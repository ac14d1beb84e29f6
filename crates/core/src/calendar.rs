//! Calendar view-model helpers.
//!
//! The client renders twelve month grids for a year; this module computes
//! the grid geometry (Sunday-first weekday offsets, day counts) and resolves
//! a date's display colors from its reservations.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::ledger::ReservationEntry;
use crate::types::{DisplayColor, UserKey, Year};

/// Month names in grid order.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Geometry of one month's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
    /// Empty cells before day 1, with Sunday as the first column.
    pub leading_blanks: u32,
    /// Number of days in the month.
    pub days: u32,
}

/// Number of days in a month, if the month is valid.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Grid geometry for one month, if the month is valid.
#[must_use]
pub fn month_grid(year: i32, month: u32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(MonthGrid {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days: days_in_month(year, month)?,
    })
}

/// The twelve month grids of a year.
#[must_use]
pub fn year_grids(year: Year) -> Vec<MonthGrid> {
    (1..=12)
        .filter_map(|month| month_grid(year.as_i32(), month))
        .collect()
}

/// Resolve the display colors of a date's reservations, in entry order.
///
/// Single booking renders solid; several render as equal slices; an owner
/// missing from the directory gets the neutral fallback.
pub fn day_colors<F>(entries: &[ReservationEntry], lookup: F) -> Vec<DisplayColor>
where
    F: Fn(&UserKey) -> Option<DisplayColor>,
{
    entries
        .iter()
        .map(|entry| lookup(&entry.user).unwrap_or_else(DisplayColor::fallback))
        .collect()
}
