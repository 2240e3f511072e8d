use super::dto::{ValidateRequest, ValidateResponse};
use super::session::Session;
use super::validator;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures_util::StreamExt;
use tracing::{info_span, Instrument};
use uuid::Uuid;
use ::validator::Validate;

/// Check a YouTube URL without launching anything
#[utoipa::path(
    post,
    path = "/api/v1/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "URL points at a video", body = ApiResponse<ValidateResponse>),
        (status = 400, description = "Invalid YouTube URL")
    ),
    tag = "Launch"
)]
pub async fn validate_url(Json(payload): Json<ValidateRequest>) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match validator::validate(&payload.url) {
        Ok(request) => ApiSuccess(
            ApiResponse::success(ValidateResponse::from(request), "URL is valid"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Upgrade to the launch log socket
pub async fn launch_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let session_id = Uuid::new_v4();
        let (tx, rx) = socket.split();
        Session::new(state.bridge.clone(), state.config.ws_heartbeat(), tx, rx)
            .run()
            .instrument(info_span!("ws_session", %session_id))
    })
}
