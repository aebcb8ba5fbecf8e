use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod inference;
pub mod quota;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::review_routes()
}
