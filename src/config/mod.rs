//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `TOME_HARVEST__*` environment variables (e.g.
//! `TOME_HARVEST__PROVIDERS__KODANSHA__FETCH_BOOK_COVERS=true`).

mod file_config;

pub use file_config::{default_config_path, find_config_file, ConfigFile, ConfigFileError};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::models::Provider;
use crate::utils::{MatchMode, RateLimitConfig, RetryConfig};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TOME_HARVEST";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shared HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Per-provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Title matching settings
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout enforced by the transport
    pub request_timeout_secs: u64,

    /// Connect timeout enforced by the transport
    pub connect_timeout_secs: u64,

    /// Upper bound on a whole call, including rate limiter waits and retries
    pub call_deadline_secs: Option<u64>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            call_deadline_secs: None,
        }
    }
}

impl HttpSettings {
    pub fn call_deadline(&self) -> Option<Duration> {
        self.call_deadline_secs.map(Duration::from_secs)
    }
}

/// Settings for every known provider
///
/// Each `[providers.<id>]` section is laid over that provider's own defaults,
/// so a partial section never falls back to another provider's budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvidersConfig {
    pub kodansha: ProviderSettings,

    pub nautiljon: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            kodansha: ProviderSettings::default(),
            nautiljon: default_nautiljon(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Kodansha => &self.kodansha,
            Provider::Nautiljon => &self.nautiljon,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::Kodansha => &mut self.kodansha,
            Provider::Nautiljon => &mut self.nautiljon,
        }
    }
}

impl<'de> Deserialize<'de> for ProvidersConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut sections = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut providers = ProvidersConfig::default();

        for provider in Provider::ALL {
            if let Some(section) = sections.remove(provider.id()) {
                let settings = providers.get_mut(provider);
                *settings = layer_settings(settings, section).map_err(D::Error::custom)?;
            }
        }
        for unknown in sections.keys() {
            tracing::warn!("Ignoring settings for unknown provider '{}'", unknown);
        }

        Ok(providers)
    }
}

fn layer_settings(
    base: &ProviderSettings,
    section: Value,
) -> Result<ProviderSettings, serde_json::Error> {
    let mut merged = serde_json::to_value(base)?;
    merge_values(&mut merged, section);
    serde_json::from_value(merged)
}

/// Recursively overwrite `base` with every key present in `overrides`
fn merge_values(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_values(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Nautiljon is scraped from HTML pages, so it gets a gentler budget
fn default_nautiljon() -> ProviderSettings {
    ProviderSettings {
        rate_limit: RateLimitSettings {
            permits_per_period: 1,
            period_ms: 1_000,
            admission_timeout_ms: 30_000,
        },
        ..ProviderSettings::default()
    }
}

/// Settings for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Whether the provider is registered at all
    pub enabled: bool,

    /// Download series cover art when fetching series metadata
    pub fetch_series_covers: bool,

    /// Download book cover art when fetching book metadata
    pub fetch_book_covers: bool,

    pub rate_limit: RateLimitSettings,

    pub retry: RetrySettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_series_covers: true,
            fetch_book_covers: false,
            rate_limit: RateLimitSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

/// Rate limiter settings as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub permits_per_period: u32,
    pub period_ms: u64,
    pub admission_timeout_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            permits_per_period: defaults.permits_per_period,
            period_ms: defaults.period.as_millis() as u64,
            admission_timeout_ms: defaults.admission_timeout.as_millis() as u64,
        }
    }
}

impl RateLimitSettings {
    pub fn to_rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            permits_per_period: self.permits_per_period,
            period: Duration::from_millis(self.period_ms),
            admission_timeout: Duration::from_millis(self.admission_timeout_ms),
        }
    }
}

/// Retry settings as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub retry_on_status: Vec<u16>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            backoff_multiplier: defaults.backoff_multiplier,
            retry_on_status: defaults.retry_on_status,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            retry_on_status: self.retry_on_status.clone(),
        }
    }
}

/// Title matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub mode: MatchMode,

    /// Minimum normalized similarity accepted in `close` mode
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Close,
            threshold: 0.9,
        }
    }
}

/// Load configuration from a file, with environment overrides on top
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment overrides and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
