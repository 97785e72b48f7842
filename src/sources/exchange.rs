use std::collections::HashMap;

use http::header::{CONTENT_TYPE, SET_COOKIE};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::settings::{TokenConfig, TokenRequestConfig};
use crate::error::{ClientError, Result};
use crate::helpers::time::{get_instant, utc_request_time};
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_SUCCESS};
use crate::parser::cookie::{split_token_cookie, TokenCookie};
use crate::utils::constants::APPLICATION_JSON;

/// Something that can trade the client credential for a fresh token.
pub trait ExchangeToken {
    fn exchange(&self) -> impl std::future::Future<Output = Result<TokenCookie>> + Send;
}

/// Payload posted to the issuer.
#[derive(Debug, Serialize)]
pub struct TokenExchangeRequest<'a> {
    pub id: &'a str,
    pub version: &'a str,
    pub requesttime: String,
    pub metadata: HashMap<String, String>,
    pub request: SecretKeyRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRequest<'a> {
    pub app_id: &'a str,
    pub client_id: &'a str,
    pub secret_key: &'a str,
}

impl<'a> TokenExchangeRequest<'a> {
    pub fn new(request: &'a TokenRequestConfig, requesttime: String) -> Self {
        Self {
            id: &request.id,
            version: &request.version,
            requesttime,
            metadata: HashMap::new(),
            request: SecretKeyRequest {
                app_id: &request.app_id,
                client_id: &request.client_id,
                secret_key: &request.secret_key,
            },
        }
    }
}

/// Secret-key exchange against the issuer's token endpoint.
#[derive(Debug, Clone)]
pub struct KeyExchangeClient {
    client: Client,
    config: TokenConfig,
}

impl KeyExchangeClient {
    pub fn new(client: Client, config: TokenConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    async fn send_exchange(&self) -> Result<TokenCookie> {
        let body = TokenExchangeRequest::new(&self.config.request, utc_request_time());
        let payload = serde_json::to_vec(&body)?;

        let response = self
            .client
            .post(&self.config.exchange_url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url: self.config.exchange_url.clone(), status });
        }

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .ok_or(ClientError::MissingCredential)?
            .to_str()
            .map_err(|e| ClientError::MalformedCookie(e.to_string()))?;
        debug!("token exchange returned Set-Cookie");

        split_token_cookie(set_cookie, &self.config.cookie_name)
    }
}

impl ExchangeToken for KeyExchangeClient {
    async fn exchange(&self) -> Result<TokenCookie> {
        let metrics = get_metrics().await;
        let start = get_instant();
        info!(client_id = %self.config.request.client_id, "exchanging secret key for token");

        let result = self.send_exchange().await;
        match &result {
            Ok(_) => {
                metrics.token_exchanges.with_label_values(&[OUTCOME_SUCCESS]).inc();
                info!(elapsed_ms = start.elapsed().as_millis() as u64, "token exchange succeeded");
            }
            Err(e) => {
                metrics.token_exchanges.with_label_values(&[OUTCOME_ERROR]).inc();
                error!(error = %e, "token exchange failed");
            }
        }
        result
    }
}
