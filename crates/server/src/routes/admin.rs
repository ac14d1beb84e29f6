//! Administrative route handlers.
//!
//! Directory management and bulk ledger operations, gated by the
//! `RequireAdmin` extractor. Destructive operations additionally require
//! an explicit `confirmed` flag in the payload.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::json;

use maison_core::{DisplayColor, Role, Year};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::routes::auth::parse_key;
use crate::services::admin::{AdminService, HistoricalRange};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// New directory user payload.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    /// Optional `#RRGGBB`; assigned from the palette when omitted.
    #[serde(default)]
    pub color: Option<String>,
}

/// Profile update payload; omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Historical import payload. The import replaces the year's ledger.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub ranges: Vec<HistoricalRange>,
    #[serde(default)]
    pub confirmed: bool,
}

/// Year clear payload.
#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub confirmed: bool,
}

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{key}", patch(update_user))
        .route("/admin/users/{key}", delete(delete_user))
        .route("/admin/users/{key}/reset", post(reset_password))
        .route("/admin/import/{year}", post(import_history))
        .route("/admin/clear/{year}", post(clear_year))
}

/// All directory users.
///
/// GET /admin/users
async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = AdminService::new(state.store()).list_users().await?;
    Ok(Json(users))
}

/// Create a directory user.
///
/// POST /admin/users
async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<User>> {
    let key = parse_key(&payload.user)?;
    let color = parse_optional_color(payload.color.as_deref())?;

    let user = AdminService::new(state.store())
        .create_user(key, payload.name, payload.role, color)
        .await?;
    Ok(Json(user))
}

/// Update a user's profile.
///
/// PATCH /admin/users/{key}
async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let key = parse_key(&key)?;
    let color = parse_optional_color(payload.color.as_deref())?;

    let user = AdminService::new(state.store())
        .update_user(&key, payload.name.as_deref(), payload.role, color.as_ref())
        .await?;
    Ok(Json(user))
}

/// Delete a directory user. Their ledger entries stay.
///
/// DELETE /admin/users/{key}
async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let key = parse_key(&key)?;
    AdminService::new(state.store()).delete_user(&key).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Clear a user's password so they can claim the account again.
///
/// POST /admin/users/{key}/reset
async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let key = parse_key(&key)?;
    AuthService::new(state.store()).reset_password(&key).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Bulk-import historical stays, replacing the year's ledger. Requires
/// confirmation.
///
/// POST /admin/import/{year}
async fn import_history(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(year): Path<i32>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<serde_json::Value>> {
    let booked = AdminService::new(state.store())
        .import_history(Year::new(year), &payload.ranges, payload.confirmed)
        .await?;
    Ok(Json(json!({ "booked": booked })))
}

/// Erase a year's ledger. Requires confirmation.
///
/// POST /admin/clear/{year}
async fn clear_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(year): Path<i32>,
    Json(payload): Json<ClearRequest>,
) -> Result<Json<serde_json::Value>> {
    let cleared = AdminService::new(state.store())
        .clear_year(Year::new(year), payload.confirmed)
        .await?;
    Ok(Json(json!({ "cleared_dates": cleared })))
}

/// Parse an optional color payload field.
fn parse_optional_color(raw: Option<&str>) -> Result<Option<DisplayColor>> {
    raw.map(|s| {
        DisplayColor::parse(s).map_err(|e| AppError::BadRequest(format!("invalid color: {e}")))
    })
    .transpose()
}
