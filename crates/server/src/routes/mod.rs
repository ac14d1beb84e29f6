//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Auth
//! POST /auth/login                  - Login with key + password
//! POST /auth/signup                 - Claim a pre-registered account
//! POST /auth/logout                 - Logout
//! GET  /auth/me                     - Current user's profile
//!
//! # Calendar
//! GET  /calendar/{year}             - Render-ready year view
//!
//! # Bookings
//! GET  /bookings/{year}             - Full year ledger
//! POST /bookings/{year}/toggle      - Toggle one date
//! POST /bookings/{year}/range       - Shift-click range gesture
//! POST /bookings/{year}/remove      - Remove a specific user's entry
//! GET  /bookings/{year}/watch       - SSE stream of ledger snapshots
//!
//! # Profile
//! POST /profile/color               - Change own display color
//!
//! # Admin
//! GET    /admin/users               - List directory users
//! POST   /admin/users               - Create directory user
//! PATCH  /admin/users/{key}         - Update a user's profile
//! DELETE /admin/users/{key}         - Delete a user (entries stay)
//! POST   /admin/users/{key}/reset   - Clear a user's password
//! POST   /admin/import/{year}       - Bulk-import historical stays
//! POST   /admin/clear/{year}        - Erase a year (confirmation required)
//! ```

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod events;
pub mod profile;

/// Build the application router (without layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(calendar::router())
        .merge(bookings::router())
        .merge(events::router())
        .merge(profile::router())
        .merge(admin::router())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
