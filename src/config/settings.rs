use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config::env::{self, EnvKey};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TV_PACKAGE: &str = "com.google.android.youtube.tv";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub static_dir: PathBuf,
    pub cors_allow_origins: CorsOrigins,
    pub adb_path: PathBuf,
    pub adb_serial: Option<String>,
    pub tv_package: String,
    pub ws_heartbeat_secs: u64,
}

/// Origins allowed to talk to the server from a browser.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// `*` means any origin, otherwise a comma separated list. Blank entries are skipped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "*" {
            return CorsOrigins::Any;
        }

        CorsOrigins::List(
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_host: env::get_or(EnvKey::ServerHost, "0.0.0.0"),
            server_port: env::get_parsed(EnvKey::ServerPort, DEFAULT_PORT),
            static_dir: PathBuf::from(env::get_or(EnvKey::StaticDir, "docs")),
            cors_allow_origins: CorsOrigins::parse(&env::get_or(EnvKey::CorsAllowOrigins, "*")),
            adb_path: PathBuf::from(env::get_or(EnvKey::AdbPath, "adb")),
            adb_serial: env::get_optional(EnvKey::AdbSerial),
            tv_package: env::get_or(EnvKey::YoutubeTvPackage, DEFAULT_TV_PACKAGE),
            ws_heartbeat_secs: env::get_parsed(EnvKey::WsHeartbeatSecs, 30),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn ws_heartbeat(&self) -> Duration {
        Duration::from_secs(self.ws_heartbeat_secs.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: DEFAULT_PORT,
            static_dir: PathBuf::from("docs"),
            cors_allow_origins: CorsOrigins::Any,
            adb_path: PathBuf::from("adb"),
            adb_serial: None,
            tv_package: DEFAULT_TV_PACKAGE.to_string(),
            ws_heartbeat_secs: 30,
        }
    }
}
