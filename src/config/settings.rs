use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::utils::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TOKEN_COOKIE_NAME,
};

/// ================================
/// Full client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub token: TokenConfig,
    /// logical api name -> base url
    #[serde(default)]
    pub apis: HashMap<String, String>,
}

/// ================================
/// Global settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default)]
    pub trust_policy: TrustPolicy,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            trust_policy: TrustPolicy::default(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Server certificate trust for downstream api calls.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrustPolicy {
    /// platform / webpki roots
    #[default]
    System,
    /// accept any server certificate chain; internal networks only
    AcceptAnyCertificate,
}

/// ================================
/// Token exchange
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    /// issuer endpoint for the secret-key exchange
    pub exchange_url: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    pub request: TokenRequestConfig,
}

#[derive(Deserialize, Clone)]
pub struct TokenRequestConfig {
    pub id: String,
    pub version: String,
    /// expected `iss` claim of cached tokens
    pub issuer_url: String,
    pub client_id: String,
    #[serde(alias = "appid")]
    pub app_id: String,
    pub secret_key: String,
}

impl fmt::Debug for TokenRequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequestConfig")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("app_id", &self.app_id)
            .field("secret_key", &"***")
            .finish()
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
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_cookie_name() -> String {
    DEFAULT_TOKEN_COOKIE_NAME.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_is_redacted_in_debug() {
        let request = TokenRequestConfig {
            id: "id".into(),
            version: "1.0".into(),
            issuer_url: "https://issuer".into(),
            client_id: "client".into(),
            app_id: "app".into(),
            secret_key: "very-secret".into(),
        };
        let printed = format!("{:?}", request);
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("client"));
    }
}
