//! Configuration validation with aggregated errors.
//! Every issue is collected before failing so one restart fixes them all.

use anyhow::{anyhow, Result};
use tracing::{error, info};

use crate::config::settings::ServiceConfig;
use crate::observability::metrics::get_metrics;

pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.server.host.is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if cfg.server.port.parse::<u16>().is_err() {
        errors.push(format!("server.port '{}' must be a valid port", cfg.server.port));
    }

    let token = &cfg.token;
    if !token.path.starts_with('/') {
        errors.push(format!("token.path '{}' must start with '/'", token.path));
    }
    if token.request_timeout_ms == 0 {
        errors.push("token.request_timeout_ms must be greater than 0".to_string());
    }
    if token.default_expires_in_seconds == 0 {
        errors.push("token.default_expires_in_seconds must be greater than 0".to_string());
    }
    if token.default_expires_in_seconds > 60 * 60 * 24 * 365 {
        errors.push(format!(
            "token.default_expires_in_seconds ({}) is unreasonably large",
            token.default_expires_in_seconds
        ));
    }
    // safety margin sane bounds
    if token.safety_margin_seconds > 60 * 60 * 24 {
        errors.push(format!(
            "token.safety_margin_seconds ({}) is unreasonably large",
            token.safety_margin_seconds
        ));
    }

    let metrics = &cfg.metrics;
    if metrics.is_enabled {
        if !metrics.path.starts_with('/') {
            errors.push(format!("metrics.path '{}' must start with '/'", metrics.path));
        }
        if metrics.path == token.path {
            errors.push(format!(
                "metrics.path and token.path must differ, both are '{}'",
                token.path
            ));
        }
    }

    if let Some(logging) = &cfg.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!(
                "logging.level '{}' must be one of trace|debug|info|warn|error",
                logging.level
            ));
        }
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(anyhow!(
            "config is not valid, total errors: {}\n{}",
            errors.len(),
            errors.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LoggingConfig;

    #[tokio::test]
    async fn defaults_are_valid() {
        assert!(validate_service_config(&ServiceConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_oversized_default_lifetime() {
        let mut cfg = ServiceConfig::default();
        cfg.token.default_expires_in_seconds = u64::MAX;

        let err = validate_service_config(&cfg).await.unwrap_err().to_string();
        assert!(err.contains("default_expires_in_seconds"), "{}", err);
    }

    #[tokio::test]
    async fn aggregates_every_issue() {
        let mut cfg = ServiceConfig::default();
        cfg.server.port = "http".into();
        cfg.token.request_timeout_ms = 0;
        cfg.logging = Some(LoggingConfig::new("loud".into(), Default::default()));

        let err = validate_service_config(&cfg).await.unwrap_err().to_string();
        assert!(err.contains("total errors: 3"), "{}", err);
        assert!(err.contains("server.port"));
        assert!(err.contains("request_timeout_ms"));
        assert!(err.contains("logging.level"));
    }
}
