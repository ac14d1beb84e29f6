//! Calendar date and year types.
//!
//! Dates travel as ISO `YYYY-MM-DD` strings everywhere: ledger map keys,
//! request bodies, and the store documents all use the same format.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, de};

/// Errors that can occur when parsing a [`DayDate`] or [`Year`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum DateError {
    /// The input is not a valid `YYYY-MM-DD` date.
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    /// The input is not a valid year.
    #[error("invalid year {0:?}")]
    InvalidYear(String),
}

/// Date string format used throughout the system.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single calendar date, the key unit of the booking ledger.
///
/// Ordered, so ledgers keep their dates sorted; serialized as a
/// `YYYY-MM-DD` string, including as a JSON map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayDate(NaiveDate);

impl DayDate {
    /// Create a `DayDate` from a [`NaiveDate`].
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Create a `DayDate` from year/month/day, if the combination is valid.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse a `DayDate` from a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDate`] if the string is not a valid date.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateError::InvalidDate(s.to_owned()))
    }

    /// The underlying [`NaiveDate`].
    #[must_use]
    pub const fn as_naive(self) -> NaiveDate {
        self.0
    }

    /// Calendar year of this date.
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month (1-12).
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of month (1-31).
    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// The next calendar day, if representable.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Whether this date is strictly before `today`.
    #[must_use]
    pub fn is_past(self, today: Self) -> bool {
        self.0 < today.0
    }
}

impl fmt::Display for DayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl std::str::FromStr for DayDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DayDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DayDateVisitor;

        impl de::Visitor<'_> for DayDateVisitor {
            type Value = DayDate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YYYY-MM-DD date string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                DayDate::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DayDateVisitor)
    }
}

/// An inclusive date range with order-independent endpoints.
///
/// Built from the anchor date and the clicked date of a shift-click gesture;
/// the endpoints are swapped if given in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DayDate,
    end: DayDate,
}

impl DateRange {
    /// Build the inclusive range between two dates, in either order.
    #[must_use]
    pub fn inclusive(a: DayDate, b: DayDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// First date of the range.
    #[must_use]
    pub const fn start(self) -> DayDate {
        self.start
    }

    /// Last date of the range.
    #[must_use]
    pub const fn end(self) -> DayDate {
        self.end
    }

    /// Iterate over every date in the range, in ascending order.
    #[must_use]
    pub const fn days(self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Iterator over the days of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<DayDate>,
    end: DayDate,
}

impl Iterator for Days {
    type Item = DayDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if current > self.end {
            return None;
        }
        self.next = current.succ();
        Some(current)
    }
}

/// A calendar year; each year's bookings live in their own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    /// Create a new `Year`.
    #[must_use]
    pub const fn new(year: i32) -> Self {
        Self(year)
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Store collection holding this year's booking document.
    #[must_use]
    pub fn bookings_collection(self) -> String {
        format!("bookings/{}", self.0)
    }

    /// Whether the given date falls in this year.
    #[must_use]
    pub fn contains(self, date: DayDate) -> bool {
        date.year() == self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Year {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>()
            .map(Self)
            .map_err(|_| DateError::InvalidYear(s.to_owned()))
    }
}
