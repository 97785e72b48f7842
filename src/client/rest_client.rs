use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};
use url::Url;

use crate::cache::token_store::TokenStore;
use crate::config::settings::ClientConfig;
use crate::error::{ClientError, Result};
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_SUCCESS};
use crate::request::composer::{self, ApiCall, ComposedRequest, RequestBody};
use crate::sources::exchange::KeyExchangeClient;
use crate::transport::tls::{build_api_client, build_issuer_client};

const EXTERNAL_API: &str = "external";

/// Authenticated client for sibling services.
///
/// Owns the token store, so the cached token lives exactly as long as the client.
#[derive(Debug, Clone)]
pub struct RestClient {
    apis: Arc<HashMap<String, String>>,
    http: Client,
    token_store: Arc<TokenStore>,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = &config.settings.transport;
        let exchange = KeyExchangeClient::new(build_issuer_client(transport)?, config.token.clone());
        Ok(Self {
            apis: Arc::new(config.apis.clone()),
            http: build_api_client(transport)?,
            token_store: Arc::new(TokenStore::from_exchange_client(exchange)),
        })
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    pub async fn get_token(&self) -> Result<String> {
        self.token_store.get_token().await
    }

    /// POST `body` to a registered api and decode the response as `T`.
    pub async fn post_api<B, T>(&self, call: &ApiCall, body: RequestBody<B>) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.call_api(Method::POST, call, call.media_type.as_deref(), body).await
    }

    /// GET a registered api and decode the response as `T`. Only the token
    /// header is sent; the call's media type applies to POST bodies.
    pub async fn get_api<T: DeserializeOwned>(&self, call: &ApiCall) -> Result<T> {
        self.call_api::<(), T>(Method::GET, call, None, RequestBody::Empty).await
    }

    /// GET a literal url, bypassing api name resolution. No token is attached.
    pub async fn get_for_object<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let start = get_instant();
        info!(url = %url, "get_for_object");
        let result = async {
            let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
            let response = self.http.get(url.clone()).send().await?;
            decode_response(&url, response).await
        }
        .await;
        record(EXTERNAL_API, &Method::GET, start, &result).await;
        result
    }

    async fn call_api<B, T>(
        &self,
        method: Method,
        call: &ApiCall,
        media_type: Option<&str>,
        body: RequestBody<B>,
    ) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let start = get_instant();
        let result = self.execute(&method, call, media_type, body).await;
        record(&call.api_name, &method, start, &result).await;
        result
    }

    async fn execute<B, T>(
        &self,
        method: &Method,
        call: &ApiCall,
        media_type: Option<&str>,
        body: RequestBody<B>,
    ) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let base_url = composer::resolve_base_url(&self.apis, &call.api_name)?;
        let url = composer::build_uri(base_url, call)?;
        info!(api = %call.api_name, %method, url = %url, "calling api");

        let token = self.token_store.get_token().await?;
        let ComposedRequest { headers, body } = composer::compose(&token, media_type, body)?;

        let mut request = self.http.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        decode_response(&url, response).await
    }
}

async fn decode_response<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status { url: url.to_string(), status });
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

async fn record<T>(api: &str, method: &Method, start: tokio::time::Instant, result: &Result<T>) {
    let metrics = get_metrics().await;
    metrics
        .api_request_duration
        .with_label_values(&[api])
        .observe(start.elapsed().as_secs_f64());
    let outcome = match result {
        Ok(_) => OUTCOME_SUCCESS,
        Err(e) => {
            error!(api = %api, %method, kind = ?e.kind(), error = %e, "api call failed");
            OUTCOME_ERROR
        }
    };
    metrics.api_requests.with_label_values(&[api, method.as_str(), outcome]).inc();
}
