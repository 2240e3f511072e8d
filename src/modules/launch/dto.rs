use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::error::LaunchError;
use super::model::LaunchRequest;

/// Frames sent by the browser over `/ws`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Open {
        #[serde(default)]
        url: Option<String>,
    },
    Ping,
}

/// Frames sent to the browser over `/ws`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Log {
        message: String,
    },
    Error {
        kind: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        returncode: Option<i32>,
    },
    Done {
        message: String,
        returncode: i32,
    },
    Pong {
        message: String,
    },
}

pub const PROTOCOL_ERROR: &str = "protocol";

impl ServerMessage {
    pub fn log(message: impl Into<String>) -> Self {
        ServerMessage::Log {
            message: message.into(),
        }
    }

    pub fn protocol_error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            kind: PROTOCOL_ERROR.to_string(),
            message: message.into(),
            returncode: None,
        }
    }

    pub fn done(returncode: i32) -> Self {
        ServerMessage::Done {
            message: format!("Exit code: {}", returncode),
            returncode,
        }
    }

    pub fn pong() -> Self {
        ServerMessage::Pong {
            message: "pong".to_string(),
        }
    }

    /// Success or failure, the last message of a launch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerMessage::Done { .. } | ServerMessage::Error { .. })
    }
}

impl From<&LaunchError> for ServerMessage {
    fn from(err: &LaunchError) -> Self {
        ServerMessage::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
            returncode: err.exit_code(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateRequest {
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub video_id: String,
    pub canonical_url: String,
}

impl From<LaunchRequest> for ValidateResponse {
    fn from(req: LaunchRequest) -> Self {
        Self {
            canonical_url: req.canonical_url(),
            video_id: req.video_id.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_client_frames() {
        let open: ClientMessage =
            serde_json::from_value(json!({"type": "open", "url": "https://youtu.be/x"})).unwrap();
        assert_eq!(
            open,
            ClientMessage::Open {
                url: Some("https://youtu.be/x".to_string())
            }
        );

        let bare: ClientMessage = serde_json::from_value(json!({"type": "open"})).unwrap();
        assert_eq!(bare, ClientMessage::Open { url: None });

        let ping: ClientMessage = serde_json::from_value(json!({"type": "ping"})).unwrap();
        assert_eq!(ping, ClientMessage::Ping);
    }

    #[test]
    fn server_frames_match_wire_shape() {
        assert_eq!(
            serde_json::to_value(ServerMessage::done(0)).unwrap(),
            json!({"type": "done", "message": "Exit code: 0", "returncode": 0})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::protocol_error("nope")).unwrap(),
            json!({"type": "error", "kind": "protocol", "message": "nope"})
        );

        let failed = LaunchError::exited(Some(1), "exit code 1: device not found");
        assert_eq!(
            serde_json::to_value(ServerMessage::from(&failed)).unwrap(),
            json!({
                "type": "error",
                "kind": "launch_failed",
                "message": "Launch failed: exit code 1: device not found",
                "returncode": 1
            })
        );
    }
}
