use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::loader::{file_to_config, parse_config};
use crate::config::settings::ServiceConfig;

/// Without a config file every setting falls back to its default.
pub async fn run(config_path: Option<&str>) -> Result<ServiceConfig> {
    match config_path {
        Some(config_path) => file_to_config(Path::new(config_path))
            .await
            .map_err(|e| anyhow!(format!("Invalid config format: {}", e))),
        None => parse_config("").await,
    }
}
