//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks urls, token request fields, cookie name and transport timeouts

use tracing::{error, info};
use url::Url;

use crate::config::settings::{ClientConfig, TokenConfig, TransportConfig};

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_client_config(cfg: &ClientConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_token(&cfg.token, &mut errors);
    validate_transport(&cfg.settings.transport, &mut errors);

    for (api_name, base_url) in &cfg.apis {
        if api_name.trim().is_empty() {
            errors.push("apis: api name must not be empty".to_string());
        }
        validate_url(&format!("apis['{}']", api_name), base_url, &mut errors);
    }

    if errors.is_empty() {
        info!("config validation passed, {} apis registered", cfg.apis.len());
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_token(token: &TokenConfig, errors: &mut Vec<String>) {
    validate_url("token.exchange_url", &token.exchange_url, errors);

    let cookie_name = token.cookie_name.as_str();
    if cookie_name.is_empty() || cookie_name.contains('=') || cookie_name.contains(';') {
        errors.push(format!(
            "token.cookie_name '{}' must be non-empty and contain neither '=' nor ';'",
            cookie_name
        ));
    }

    let request = &token.request;
    for (field, value) in [
        ("id", &request.id),
        ("version", &request.version),
        ("issuer_url", &request.issuer_url),
        ("client_id", &request.client_id),
        ("app_id", &request.app_id),
        ("secret_key", &request.secret_key),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("token.request.{} must not be empty", field));
        }
    }
}

fn validate_transport(transport: &TransportConfig, errors: &mut Vec<String>) {
    if transport.connect_timeout_ms == 0 {
        errors.push("settings.transport.connect_timeout_ms must be > 0".to_string());
    }
    if transport.request_timeout_ms == 0 {
        errors.push("settings.transport.request_timeout_ms must be > 0".to_string());
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(format!("{}: '{}' cannot be used as a base url", field, value))
        }
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(format!("{}: unsupported scheme '{}'", field, url.scheme()))
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("{}: invalid url '{}': {}", field, value, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{SettingsConfig, TokenRequestConfig};
    use std::collections::HashMap;

    fn config() -> ClientConfig {
        ClientConfig {
            settings: SettingsConfig::default(),
            token: TokenConfig {
                exchange_url: "https://issuer.local/token".into(),
                cookie_name: "Authorization".into(),
                request: TokenRequestConfig {
                    id: "id".into(),
                    version: "1.0".into(),
                    issuer_url: "https://issuer.local/realm".into(),
                    client_id: "client".into(),
                    app_id: "app".into(),
                    secret_key: "secret".into(),
                },
            },
            apis: HashMap::from([("IDREPO".to_string(), "https://idrepo.local/v1".to_string())]),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_client_config(&config()).is_ok());
    }

    #[test]
    fn aggregates_all_issues() {
        let mut cfg = config();
        cfg.token.exchange_url = "not a url".into();
        cfg.token.cookie_name = "a=b".into();
        cfg.token.request.secret_key = "".into();
        cfg.settings.transport.request_timeout_ms = 0;
        cfg.apis.insert("BROKEN".into(), "mailto:x@y".into());

        let errors = validate_client_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 5, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("token.request.secret_key")));
        assert!(errors.iter().any(|e| e.contains("apis['BROKEN']")));
    }
}
