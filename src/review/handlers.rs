use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::{AuthUser, JwtKeys},
    error::ApiError,
    review::{
        dto::{HistoryEntry, ReviewRequest, ReviewResponse},
        inference::parse_reply,
        repo::{self, QuotaOutcome},
    },
    state::AppState,
};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/review", post(submit_review))
        .route("/history", get(get_history))
}

#[instrument(skip(state, payload))]
pub async fn submit_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let token = payload
        .token
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Missing session token"))?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("review with invalid token");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    if payload.code.trim().is_empty() {
        return Err(ApiError::Validation("Code must not be empty".into()));
    }

    // Entitlement check and counter increment happen as one step, before the
    // inference call. An upstream failure after this point does not refund
    // the unit.
    let usage_count = match repo::consume_quota(&state.db, claims.sub).await? {
        QuotaOutcome::Allowed { usage_count } => usage_count,
        QuotaOutcome::Denied => {
            info!(account_id = %claims.sub, "free-tier quota exhausted");
            return Err(ApiError::QuotaExceeded);
        }
        QuotaOutcome::UnknownAccount => {
            warn!(account_id = %claims.sub, "token for a deleted account");
            return Err(ApiError::unauthorized("Invalid session"));
        }
    };

    let reply = state
        .inference
        .review_code(&payload.code)
        .await
        .map_err(ApiError::Upstream)?;
    let (review, fixed_code) = parse_reply(&reply);

    // Placeholder metric: a random value in a fixed range, not derived from
    // the review content.
    let score = rand::thread_rng().gen_range(70..=98);

    repo::append_review(&state.db, claims.sub, &payload.code, &review, score).await?;

    info!(account_id = %claims.sub, score, usage_count, "review stored");
    Ok(Json(ReviewResponse {
        review,
        fixed_code,
        score,
        usage_count,
    }))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(account_id, _role): AuthUser,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let rows = repo::list_history(&state.db, account_id).await?;
    let entries = rows.into_iter().map(HistoryEntry::from).collect();
    Ok(Json(entries))
}
