use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidInput(String),

    #[error("Launch failed: {reason}")]
    LaunchFailed {
        reason: String,
        exit_code: Option<i32>,
    },
}

impl LaunchError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        LaunchError::InvalidInput(reason.into())
    }

    /// The process never ran to completion (spawn or wait failure).
    pub fn failed(reason: impl Into<String>) -> Self {
        LaunchError::LaunchFailed {
            reason: reason.into(),
            exit_code: None,
        }
    }

    pub fn exited(exit_code: Option<i32>, reason: impl Into<String>) -> Self {
        LaunchError::LaunchFailed {
            reason: reason.into(),
            exit_code,
        }
    }

    /// Wire name used in `error` messages sent to the browser.
    pub fn kind(&self) -> &'static str {
        match self {
            LaunchError::InvalidInput(_) => "invalid_input",
            LaunchError::LaunchFailed { .. } => "launch_failed",
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::InvalidInput(_) => None,
            LaunchError::LaunchFailed { exit_code, .. } => *exit_code,
        }
    }
}
