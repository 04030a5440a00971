//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ClientError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    /// Optional file that receives a copy of the logs
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Deploy service configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Interval between result queries while a build runs in the background
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    3000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            json_logs: false,
            log_file: None,
            backend: BackendSettings::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Deploy service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the deploy service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the submit endpoint
    #[serde(default = "default_submit_path")]
    pub submit_path: String,

    /// Path of the result endpoint
    #[serde(default = "default_result_path")]
    pub result_path: String,

    /// Path of the health endpoint
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Timeout in seconds for result and health queries
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout in seconds for the submit request; unset waits for the
    /// service however long a synchronous build takes
    #[serde(default)]
    pub submit_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:7860".to_string()
}

fn default_submit_path() -> String {
    "/api-endpoint".to_string()
}

fn default_result_path() -> String {
    "/result".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            submit_path: default_submit_path(),
            result_path: default_result_path(),
            health_path: default_health_path(),
            request_timeout_secs: default_request_timeout_secs(),
            submit_timeout_secs: None,
        }
    }
}

/// Load settings from `file`, or the defaults when no file is given
pub async fn load_settings(file: Option<&File>) -> Result<Settings, ClientError> {
    let Some(file) = file else {
        return Ok(Settings::default());
    };

    if !file.exists().await {
        return Err(ClientError::ConfigError(format!(
            "Settings file not found: {}",
            file.path().display()
        )));
    }

    debug!("Loading settings from {}", file.path().display());
    let settings: Settings = file.read_json().await?;
    if settings.poll_interval_ms == 0 {
        return Err(ClientError::ConfigError(
            "poll_interval_ms must be greater than zero".to_string(),
        ));
    }
    Ok(settings)
}
