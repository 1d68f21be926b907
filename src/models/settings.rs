//! Settings Models
//!
//! Client settings stored in config.json.

use std::time::Duration;

use quality_lens_client::ClientConfig;
use quality_lens_core::ProxyConfig;
use serde::{Deserialize, Serialize};

/// Settings for reaching and polling the analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Root URL of the analysis engine API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay between status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Consecutive failed poll ticks tolerated before the error is surfaced
    #[serde(default = "default_max_consecutive_poll_failures")]
    pub max_consecutive_poll_failures: u32,
    /// Refresh the current job automatically after reconnecting
    #[serde(default = "default_network_retry_enabled")]
    pub network_retry_enabled: bool,
    /// Trend horizon in days
    #[serde(default = "default_trend_days")]
    pub default_trend_days: u32,
    /// Optional outbound proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_max_consecutive_poll_failures() -> u32 {
    3
}

fn default_network_retry_enabled() -> bool {
    true
}

fn default_trend_days() -> u32 {
    30
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_consecutive_poll_failures: default_max_consecutive_poll_failures(),
            network_retry_enabled: default_network_retry_enabled(),
            default_trend_days: default_trend_days(),
            proxy: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_consecutive_poll_failures: Option<u32>,
    pub network_retry_enabled: Option<bool>,
    pub default_trend_days: Option<u32>,
    /// `Some(None)` removes the proxy
    pub proxy: Option<Option<ProxyConfig>>,
}

impl ClientSettings {
    /// Apply a partial update to the settings
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(base_url) = update.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(interval) = update.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(max) = update.max_consecutive_poll_failures {
            self.max_consecutive_poll_failures = max;
        }
        if let Some(enabled) = update.network_retry_enabled {
            self.network_retry_enabled = enabled;
        }
        if let Some(days) = update.default_trend_days {
            self.default_trend_days = days;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = proxy;
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        match url::Url::parse(base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(format!(
                    "base_url must use http or https, got '{}'",
                    url.scheme()
                ))
            }
            Err(e) => return Err(format!("Invalid base_url '{}': {}", self.base_url, e)),
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".to_string());
        }
        if self.max_consecutive_poll_failures == 0 {
            return Err("max_consecutive_poll_failures must be at least 1".to_string());
        }
        if self.default_trend_days == 0 {
            return Err("default_trend_days must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection settings for the HTTP client
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.base_url.trim()).with_timeout(self.request_timeout());
        match &self.proxy {
            Some(proxy) => config.with_proxy(proxy.clone()),
            None => config,
        }
    }
}
