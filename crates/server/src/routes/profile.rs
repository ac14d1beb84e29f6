//! Profile route handlers.
//!
//! Users manage their own display color here; everything else about a
//! profile is an admin concern.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use maison_core::DisplayColor;

use crate::db::directory::UserDirectory;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Color update payload.
#[derive(Debug, Deserialize)]
pub struct ColorRequest {
    /// New display color, `#RRGGBB`.
    pub color: String,
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/profile/color", post(update_color))
}

/// Change the logged-in user's display color.
///
/// Existing ledger entries are untouched; the calendar recolors because
/// entry colors are resolved against the directory at render time.
///
/// POST /profile/color
async fn update_color(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(payload): Json<ColorRequest>,
) -> Result<Json<User>> {
    let color = DisplayColor::parse(&payload.color)
        .map_err(|e| AppError::BadRequest(format!("invalid color: {e}")))?;

    UserDirectory::new(state.store())
        .update_profile(&current.key, None, None, Some(&color))
        .await?;

    let user = AuthService::new(state.store()).get_user(&current.key).await?;
    Ok(Json(user))
}
