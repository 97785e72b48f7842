use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::token::Token;
use crate::error::Result;
use crate::observability::metrics::get_metrics;
use crate::parser::jwt::is_valid_bearer_token;
use crate::sources::exchange::{ExchangeToken, KeyExchangeClient};

/// Single-slot token cache with local validation and single-flight refresh.
///
/// The slot lock is held across validate, exchange and write, so concurrent
/// callers that find the token invalid wait for one exchange and then reuse
/// its result.
#[derive(Debug)]
pub struct TokenStore<E = KeyExchangeClient> {
    exchange: E,
    cookie_name: String,
    issuer_url: String,
    client_id: String,
    slot: Mutex<Option<Token>>,
}

impl<E: ExchangeToken> TokenStore<E> {
    pub fn new(exchange: E, cookie_name: String, issuer_url: String, client_id: String) -> Self {
        Self { exchange, cookie_name, issuer_url, client_id, slot: Mutex::new(None) }
    }

    /// `Cookie` header value for the current token, refreshing it when the
    /// cached one is missing, malformed, expired or issued for someone else.
    pub async fn get_token(&self) -> Result<String> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref().filter(|t| self.is_reusable(t)) {
            get_metrics().await.token_cache_hits.inc();
            debug!("reusing cached token");
            return Ok(format!("{}={}", self.cookie_name, token.raw_value));
        }

        info!("cached token missing or invalid, refreshing");
        let cookie = self.exchange.exchange().await?;
        *slot = Some(Token::new(cookie.raw_token, self.client_id.clone(), self.issuer_url.clone()));
        Ok(cookie.header_value)
    }

    /// Drop the cached token; the next `get_token` exchanges again.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            info!("cached token invalidated");
        }
    }

    pub async fn cached_token(&self) -> Option<Token> {
        self.slot.lock().await.clone()
    }

    #[cfg(test)]
    pub(crate) async fn store_raw_token(&self, raw_value: String) {
        *self.slot.lock().await =
            Some(Token::new(raw_value, self.client_id.clone(), self.issuer_url.clone()));
    }

    fn is_reusable(&self, token: &Token) -> bool {
        !token.raw_value.is_empty()
            && is_valid_bearer_token(&token.raw_value, &self.issuer_url, &self.client_id)
    }
}

impl TokenStore<KeyExchangeClient> {
    pub fn from_exchange_client(exchange: KeyExchangeClient) -> Self {
        let config = exchange.config();
        let cookie_name = config.cookie_name.clone();
        let issuer_url = config.request.issuer_url.clone();
        let client_id = config.request.client_id.clone();
        Self::new(exchange, cookie_name, issuer_url, client_id)
    }
}
