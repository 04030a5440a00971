//! Application configuration options

use std::time::Duration;

use crate::config::settings::Settings;
use crate::controller::submission;
use crate::http::client::Routes;
use crate::logs::LogOptions;
use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Deploy service base URL
    pub backend_base_url: String,

    /// Deploy service endpoint paths
    pub routes: Routes,

    /// Timeout for result and health queries
    pub request_timeout: Duration,

    /// Timeout for the submit request, unbounded when `None`
    pub submit_timeout: Option<Duration>,

    /// Submission controller options
    pub controller: submission::Options,

    /// Logging options
    pub log: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AppOptions {
    /// Derive typed options from a settings file
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            backend_base_url: settings.backend.base_url.clone(),
            routes: Routes {
                submit: settings.backend.submit_path.clone(),
                result: settings.backend.result_path.clone(),
                health: settings.backend.health_path.clone(),
            },
            request_timeout: Duration::from_secs(settings.backend.request_timeout_secs),
            submit_timeout: settings.backend.submit_timeout_secs.map(Duration::from_secs),
            controller: submission::Options {
                poller: poller::Options {
                    interval: Duration::from_millis(settings.poll_interval_ms),
                },
            },
            log: LogOptions {
                log_level: settings.log_level.clone(),
                json_format: settings.json_logs,
                log_file: settings.log_file.clone(),
            },
        }
    }
}
