use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod session;
pub mod validator;

/// Routes nested under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(handler::validate_url))
}

pub fn socket_router() -> Router<AppState> {
    Router::new().route("/ws", get(handler::launch_socket))
}
