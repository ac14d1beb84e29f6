//! Authentication route handlers.
//!
//! Login and account claiming against the directory access list. All
//! endpoints speak JSON; the calendar client is a single-page app.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use maison_core::UserKey;

use crate::error::{AppError, Result};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login / signup payload.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub user: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Login with user key and password.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<User>> {
    let key = parse_key(&payload.user)?;
    let auth = AuthService::new(state.store());
    let user = auth.login(&key, &payload.password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(AuthError::from)?;

    Ok(Json(user))
}

/// Claim a pre-registered account by setting its first password, then log
/// straight in.
///
/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<User>> {
    let key = parse_key(&payload.user)?;
    let auth = AuthService::new(state.store());
    let user = auth.signup(&key, &payload.password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(AuthError::from)?;

    Ok(Json(user))
}

/// Logout and clear the session.
///
/// POST /auth/logout
async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await.map_err(AuthError::from)?;
    Ok(Json(json!({ "ok": true })))
}

/// The logged-in user's current profile.
///
/// GET /auth/me
async fn me(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.store());
    let user = auth.get_user(&current.key).await?;
    Ok(Json(user))
}

/// Parse a user key out of a request payload.
pub(super) fn parse_key(raw: &str) -> Result<UserKey> {
    UserKey::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid user key: {e}")))
}
