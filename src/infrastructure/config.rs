use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::live_watcher::WatcherConfig;
use crate::presentation::table::Thresholds;

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub mqtt: Option<MqttSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default = "default_mqtt_topic")]
    pub topic: String,
}

/// Client-local display configuration: alert thresholds plus feed pacing.
/// The threshold part is user-editable at runtime and written back to disk.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(default)]
pub struct DisplayConfig {
    pub thresholds: Thresholds,
    pub page_size: usize,
    pub poll_interval_secs: u64,
    pub notify_ttl_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            page_size: 10,
            poll_interval_secs: 10,
            notify_ttl_secs: 8,
        }
    }
}

impl DisplayConfig {
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            notify_ttl: Duration::from_secs(self.notify_ttl_secs),
        }
    }
}

pub fn load_backend_config() -> anyhow::Result<BackendConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/backend"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Missing file falls back to the defaults; a fresh checkout works offline.
pub fn load_display_config() -> anyhow::Result<DisplayConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/display").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Persist the display configuration (the threshold dialog's "save").
pub fn save_display_config(path: &Path, display: &DisplayConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(display)?;
    std::fs::write(path, rendered)?;
    Ok(())
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "mediciones/nuevas".to_string()
}
