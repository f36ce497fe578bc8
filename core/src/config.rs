//! Service configuration.
//!
//! The host owns the configuration and hands it to `ApiClient` or
//! `ApiService` at construction. Nothing here is global.

use serde::Deserialize;

/// Environment variable read by [`ServiceConfig::from_env`].
pub const LOG_RAW_JSON_ENV: &str = "API_LOG_RAW_JSON";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Log the raw body of every successful response at `info` level.
    pub log_raw_json: bool,
}

impl ServiceConfig {
    pub fn with_log_raw_json(mut self, enabled: bool) -> Self {
        self.log_raw_json = enabled;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        let log_raw_json = std::env::var(LOG_RAW_JSON_ENV)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self { log_raw_json }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
