//! Maison server library.
//!
//! Shared-calendar backend for a family vacation house: a per-year booking
//! ledger over an in-process document store, a directory of invited users,
//! and a notification outbox. Exposed as a JSON API with SSE updates.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;

use axum::Router;

pub use config::ServerConfig;
pub use state::AppState;

/// Build the complete application: routes, session layer, tracing and
/// Sentry layers, with state applied.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes()
        .layer(session_layer)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
