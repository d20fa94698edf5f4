//! Client configuration with defaults and environment overrides.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Options recognized by [`FplClient`](crate::FplClient).
///
/// Every field has a default, so an empty configuration source (no
/// environment variables, `{}` as JSON) yields a working client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,
    pub enable_cache: bool,
    /// Total attempts per fetch, including the first one.
    pub retry_attempts: u32,
    #[serde(with = "duration_millis")]
    pub retry_delay: Duration,
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            cache_ttl: DEFAULT_CACHE_TTL,
            enable_cache: true,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("fpl-data/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `FPL_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `FPL_BASE_URL` | `base_url` |
    /// | `FPL_CACHE_TTL_SECONDS` | `cache_ttl` |
    /// | `FPL_ENABLE_CACHE` | `enable_cache` |
    /// | `FPL_RETRY_ATTEMPTS` | `retry_attempts` |
    /// | `FPL_RETRY_DELAY_MS` | `retry_delay` |
    /// | `FPL_REQUEST_TIMEOUT_MS` | `request_timeout` |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    ///
    /// Unparsable values are logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("FPL_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FPL_CACHE_TTL_SECONDS") {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(enabled) = parse_var::<bool>(&lookup, "FPL_ENABLE_CACHE") {
            config.enable_cache = enabled;
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, "FPL_RETRY_ATTEMPTS") {
            config.retry_attempts = attempts;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "FPL_RETRY_DELAY_MS") {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "FPL_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(ms);
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
