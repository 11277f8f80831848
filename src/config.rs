//! Configuration management for Floodgate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the Floodgate demos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloodgateConfig {
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Simulated upstream configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum requests allowed per identity inside the window
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl RateLimitingConfig {
    /// The window as a typed duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> usize {
    5
}

fn default_window_secs() -> u64 {
    60
}

/// Simulated upstream and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// URL passed to the simulated upstream
    #[serde(default = "default_url")]
    pub url: String,

    /// Maximum fetch attempts
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between failed attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Simulated network latency in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Probability in [0, 1] that a simulated call succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

impl UpstreamConfig {
    /// The retry delay as a typed duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The simulated latency as a typed duration.
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            latency_ms: default_latency_ms(),
            success_rate: default_success_rate(),
        }
    }
}

fn default_url() -> String {
    "https://api.example.com/data".to_string()
}

fn default_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_latency_ms() -> u64 {
    500
}

fn default_success_rate() -> f64 {
    0.4
}

impl FloodgateConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: FloodgateConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::FloodgateError::Config(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FloodgateConfig::default();

        assert_eq!(config.rate_limiting.max_requests, 5);
        assert_eq!(config.rate_limiting.window(), Duration::from_secs(60));
        assert_eq!(config.upstream.url, "https://api.example.com/data");
        assert_eq!(config.upstream.attempts, 3);
        assert_eq!(config.upstream.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.upstream.latency(), Duration::from_millis(500));
        assert_eq!(config.upstream.success_rate, 0.4);
    }

    #[test]
    fn test_partial_yaml_fills_in_defaults() {
        let yaml = "rate_limiting:\n  max_requests: 10\n";
        let config: FloodgateConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.rate_limiting.max_requests, 10);
        assert_eq!(config.rate_limiting.window_secs, 60);
        assert_eq!(config.upstream.attempts, 3);
    }
}
