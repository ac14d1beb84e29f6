//! Business logic services.
//!
//! Services own the capability checks and read-modify-write cycles;
//! repositories below them only move documents, and routes above them only
//! translate HTTP.

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod outbox;

pub use admin::{AdminError, AdminService, HistoricalRange};
pub use auth::{AuthError, AuthService};
pub use bookings::{BookingError, BookingService};
pub use outbox::{MailMessage, OutboxService};
