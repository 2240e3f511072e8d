use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerHost,
    ServerPort,
    StaticDir,
    CorsAllowOrigins,
    AdbPath,
    AdbSerial,
    YoutubeTvPackage,
    WsHeartbeatSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerHost => "APP_HOST",
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::StaticDir => "STATIC_DIR",
            EnvKey::CorsAllowOrigins => "CORS_ALLOW_ORIGINS",
            EnvKey::AdbPath => "ADB_PATH",
            EnvKey::AdbSerial => "ADB_SERIAL",
            EnvKey::YoutubeTvPackage => "YOUTUBE_TV_PACKAGE",
            EnvKey::WsHeartbeatSecs => "WS_HEARTBEAT_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are both treated as absent.
pub fn get_optional(key: EnvKey) -> Option<String> {
    get(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
