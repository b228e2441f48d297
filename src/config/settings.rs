use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_EXPIRES_IN_SECS, DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_METRICS_PATH,
    DEFAULT_PORT, DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_PATH,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub token: TokenSettings,
    pub metrics: MetricsConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT.to_owned(),
        }
    }
}

/// ================================
/// Token endpoint & cache behaviour
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TokenSettings {
    /// route the token is served on
    pub path: String,
    /// a cached token is only handed out while it outlives now by this much
    pub safety_margin_seconds: u64,
    /// lifetime assumed when upstream omits `expires_in`
    pub default_expires_in_seconds: u64,
    /// upper bound for one upstream exchange
    pub request_timeout_ms: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_TOKEN_PATH.to_owned(),
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
            default_expires_in_seconds: DEFAULT_EXPIRES_IN_SECS,
            request_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: false,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}
