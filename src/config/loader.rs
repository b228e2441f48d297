use std::{fs, path::Path};

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{LoggingConfig, ServiceConfig};
use crate::config::validator::validate_service_config;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config {}: {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded).await
}

pub async fn parse_config(content: &str) -> Result<ServiceConfig> {
    // an empty document deserializes to unit, not to the defaults
    let mut service_config: ServiceConfig = if content.trim().is_empty() {
        ServiceConfig::default()
    } else {
        serde_yaml::from_str(content).inspect_err(|e| {
            error!("parse config error: {}", e);
        })?
    };

    // Apply defaults
    if service_config.logging.is_none() {
        service_config.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate_service_config(&service_config).await?;

    Ok(service_config)
}

/// `${VAR}` and `${VAR:default}` are replaced from the process environment.
fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
