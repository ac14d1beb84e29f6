//! Maison Core - Shared types and booking-ledger logic.
//!
//! This crate provides the domain model used across all Maison components:
//! - `server` - Booking service, user directory, and HTTP surface
//! - `cli` - Command-line tools for seeding and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no store
//! access, no HTTP. The booking ledger and its merge rules live here so they
//! can be tested without a running store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user keys, roles, colors, and dates
//! - [`ledger`] - The per-year booking ledger and its toggle/range semantics
//! - [`calendar`] - Month grids and display-color resolution for rendering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod calendar;
pub mod ledger;
pub mod types;

pub use ledger::*;
pub use types::*;
