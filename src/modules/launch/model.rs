use std::fmt;

use serde::Serialize;

pub const MAX_VIDEO_ID_LEN: usize = 64;

/// A YouTube video identifier. Only built by the request validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let valid_len = !raw.is_empty() && raw.len() <= MAX_VIDEO_ID_LEN;
        let valid_chars = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        (valid_len && valid_chars).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub url: String,
    pub video_id: VideoId,
}

impl LaunchRequest {
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    /// The URL handed to the TV app. Rebuilt from the id so nothing but the id crosses to the device.
    pub fn canonical_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}
