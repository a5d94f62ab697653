//! Gateway configuration.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TODO_LIMIT: usize = 20;

const ENV_BASE_URL: &str = "DASHBOARD_API_URL";
const ENV_TIMEOUT_SECS: &str = "DASHBOARD_API_TIMEOUT_SECS";
const ENV_TODO_LIMIT: &str = "DASHBOARD_TODO_LIMIT";

/// Fixed parameters applied to every gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Page size requested when listing todos.
    pub todo_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            todo_limit: DEFAULT_TODO_LIMIT,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_todo_limit(mut self, limit: usize) -> Self {
        self.todo_limit = limit;
        self
    }

    /// Build a config from `DASHBOARD_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_BASE_URL,
                    value: url,
                });
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_positive(ENV_TIMEOUT_SECS, raw)?);
        }
        if let Some(raw) = lookup(ENV_TODO_LIMIT) {
            let limit = parse_positive(ENV_TODO_LIMIT, raw)?;
            config.todo_limit = usize::try_from(limit).map_err(|_| ConfigError::InvalidNumber {
                var: ENV_TODO_LIMIT,
                value: limit.to_string(),
            })?;
        }
        Ok(config)
    }
}

fn parse_positive(var: &'static str, raw: String) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}
