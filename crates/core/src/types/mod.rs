//! Core types for Maison.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod color;
pub mod date;
pub mod key;
pub mod role;

pub use color::{ColorError, DisplayColor, PALETTE};
pub use date::{DateError, DateRange, DayDate, Year};
pub use key::{KeyError, UserKey};
pub use role::Role;
