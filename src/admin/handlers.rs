use axum::{
    extract::{Path, State},
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::{
        dto::{AdminUserEntry, MessageResponse, StatsResponse, UpdateUserRequest},
        repo,
    },
    auth::jwt::AdminUser,
    error::ApiError,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/users/:id/role", patch(update_user))
        .route("/admin/users/:id", delete(delete_user))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let accounts = repo::list_accounts(&state.db).await?;
    let total_users = accounts.len() as i64;
    let total_audits = accounts.iter().map(|a| a.audit_count).sum();
    let users = accounts.into_iter().map(AdminUserEntry::from).collect();
    Ok(Json(StatsResponse {
        total_users,
        total_audits,
        users,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.role.is_none() && payload.subscription.is_none() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    let updated = repo::update_account(&state.db, id, payload.role, payload.subscription).await?;
    if !updated {
        warn!(account_id = %id, "update target not found");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(admin_id = %admin_id, account_id = %id, role = ?payload.role,
          subscription = ?payload.subscription, "account updated");
    Ok(Json(MessageResponse {
        message: "User updated".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repo::delete_account(&state.db, id).await?;
    if !deleted {
        warn!(account_id = %id, "delete target not found");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(admin_id = %admin_id, account_id = %id, "account deleted");
    Ok(Json(MessageResponse {
        message: "User deleted".into(),
    }))
}
