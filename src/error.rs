use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Errors surfaced at the HTTP boundary. Every variant maps to a status code
/// and a JSON body of the form `{"error": "..."}`; quota rejections also carry
/// an upgrade hint under `"message"`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    Conflict,
    #[error("{0}")]
    Unauthorized(String),
    #[error("Admin access required")]
    Forbidden,
    #[error("Daily limit reached")]
    QuotaExceeded,
    #[error("{0}")]
    NotFound(String),
    #[error("AI processing failed")]
    Upstream(#[source] anyhow::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Maps a repo failure, surfacing a unique-constraint violation as a
    /// Conflict instead of an internal error. Duplicate signups that race past
    /// the advisory pre-check still land on the `accounts.email` constraint
    /// and must come back as 409.
    pub fn from_repo(e: anyhow::Error) -> Self {
        if let Some(db_err) = e
            .downcast_ref::<sqlx::Error>()
            .and_then(|se| se.as_database_error())
        {
            if db_err.is_unique_violation() {
                return Self::Conflict;
            }
        }
        Self::Internal(e)
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::QuotaExceeded => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // The SPA expects the original wire contract: inference failures
            // come back as a plain 500 with "AI processing failed".
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 5xx details go to the log, not the client.
        match &self {
            Self::Upstream(e) => error!(error = %e, "inference call failed"),
            Self::Internal(e) => error!(error = %e, "internal error"),
            _ => {}
        }
        let status = self.status();
        let body = match &self {
            Self::QuotaExceeded => json!({
                "error": self.to_string(),
                "message": "Upgrade to Premium for unlimited reviews",
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
