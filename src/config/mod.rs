//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::harvest::HarvestLimits;
use crate::utils::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Run-bounding limits
    #[serde(default)]
    pub limits: LimitConfig,

    /// Retry/backoff settings
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Registry API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Subscription key; required before any network activity
    #[serde(default = "api_key_from_env")]
    pub key: Option<String>,

    /// Base URL of the trademark register
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Dump both documents when a duplicate is found
    #[serde(default = "verbose_from_env")]
    pub verbose: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: api_key_from_env(),
            base_url: default_base_url(),
            verbose: verbose_from_env(),
        }
    }
}

fn api_key_from_env() -> Option<String> {
    std::env::var("API_KEY").ok()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn verbose_from_env() -> bool {
    std::env::var("VERBOSE").is_ok()
}

/// Run-bounding limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Highest page number processed before stopping
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,

    /// Duplicate count above which the run is abandoned
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: u32,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            page_cap: default_page_cap(),
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

fn default_page_cap() -> u32 {
    500
}

fn default_duplicate_threshold() -> u32 {
    100
}

impl From<LimitConfig> for HarvestLimits {
    fn from(limits: LimitConfig) -> Self {
        Self {
            page_cap: limits.page_cap,
            duplicate_threshold: limits.duplicate_threshold,
        }
    }
}

/// Retry/backoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for the exponential schedule, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    50_000
}

impl From<RetryConfig> for RetryPolicy {
    fn from(retry: RetryConfig) -> Self {
        Self {
            max_retries: retry.max_retries,
            base_delay: Duration::from_millis(retry.base_delay_ms),
            max_delay: Duration::from_millis(retry.max_delay_ms),
        }
    }
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("TRADEMARK_HARVESTER").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_match_the_registry_profile() {
        let config = Config::default();
        assert_eq!(config.limits.page_cap, 500);
        assert_eq!(config.limits.duplicate_threshold, 100);
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn test_retry_config_converts_to_policy() {
        let policy: RetryPolicy = RetryConfig::default().into();
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_millis(50_000));
    }

    #[test]
    fn test_load_config_reads_a_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "trademark-harvester-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[limits]\npage_cap = 10\nduplicate_threshold = 7\n").unwrap();

        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.limits.page_cap, 10);
        assert_eq!(config.limits.duplicate_threshold, 7);
        assert_eq!(config.retry.max_retries, 5);
    }
}
