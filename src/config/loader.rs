use std::path::Path;

use regex::{Captures, Regex};
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LoggingConfig};
use crate::config::validator;
use crate::error::{ClientError, Result};
use crate::observability::metrics::get_metrics;

/// Load, expand and validate the client config from a YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ClientError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_config(&expand_env_vars(&content)).await
}

pub async fn parse_config(content: &str) -> Result<ClientConfig> {
    let metrics = get_metrics().await;
    let mut client_config: ClientConfig = serde_yaml::from_str(content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_errors.inc();
        })
        .map_err(|e| ClientError::Config(format!("invalid config format: {}", e)))?;

    // Apply defaults
    if client_config.settings.logging.is_none() {
        client_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    validator::validate_client_config(&client_config).map_err(|errors| {
        metrics.config_errors.inc();
        ClientError::Config(errors.join("; "))
    })?;

    Ok(client_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values
pub fn expand_env_vars(input: &str) -> String {
    // literal pattern, always compiles
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("env var pattern");
    re.replace_all(input, |caps: &Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
