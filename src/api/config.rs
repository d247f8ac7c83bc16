//! Configuration for the detection service client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detection service client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionApiConfig {
    /// Detection service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as `X-API-Key` (read from env DETECTION_API_KEY if not set)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Page size for evidence pagination
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Debug mode: skip mutating calls (rule updates, analysis triggers)
    #[serde(default)]
    pub debug: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    20000
}

fn default_page_size() -> usize {
    100
}

impl Default for DetectionApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_ms: default_timeout_ms(),
            page_size: default_page_size(),
            debug: false,
        }
    }
}

impl DetectionApiConfig {
    /// Load configuration from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("DETECTION_API_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("DETECTION_API_KEY") {
            self.api_key = Some(val);
        }

        if let Ok(val) = std::env::var("DETECTION_API_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }

        if let Ok(val) = std::env::var("DETECTION_API_PAGE_SIZE") {
            if let Ok(size) = val.parse() {
                self.page_size = size;
            }
        }

        if let Ok(val) = std::env::var("DETECTION_API_DEBUG") {
            self.debug = val.to_lowercase() == "true" || val == "1";
        }

        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectionApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_ms, 20000);
        assert_eq!(config.page_size, 100);
        assert!(!config.debug);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("DETECTION_API_URL", "http://custom:9000");
        std::env::set_var("DETECTION_API_KEY", "test-key");
        std::env::set_var("DETECTION_API_DEBUG", "1");

        let config = DetectionApiConfig::default().from_env();

        assert_eq!(config.base_url, "http://custom:9000");
        assert_eq!(config.api_key, Some("test-key".to_string()));
        assert!(config.debug);

        std::env::remove_var("DETECTION_API_URL");
        std::env::remove_var("DETECTION_API_KEY");
        std::env::remove_var("DETECTION_API_DEBUG");
    }

    #[test]
    fn test_timeout_conversion() {
        let config = DetectionApiConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20000));
    }
}
