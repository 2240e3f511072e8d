use crate::config::settings::AppConfig;
use crate::infrastructure::adb::bridge::AdbBridge;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub bridge: AdbBridge,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let bridge = AdbBridge::from_config(&config);
        Self { config, bridge }
    }
}
