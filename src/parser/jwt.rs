use anyhow::{anyhow, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use crate::helpers::time::now_i64;

/// Claims needed to decide whether a cached token can be reused.
#[derive(Debug, Deserialize)]
pub struct BearerClaims {
    pub exp: Option<i64>,
    pub iss: Option<String>,
    pub azp: Option<String>,
    pub aud: Option<Audience>,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, client_id: &str) -> bool {
        match self {
            Audience::One(aud) => aud == client_id,
            Audience::Many(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

pub fn decode_jwt_from_string(token_string: &str) -> Result<BearerClaims> {
    let parts: Vec<&str> = token_string.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format"));
    }

    let decoded = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<BearerClaims>(&decoded).map_err(|e| anyhow!("invalid JWT payload: {}", e))
}

/// Local check of issuer, intended client and expiry. No signature check and
/// no network call; any decoding problem makes the token invalid.
pub fn is_valid_bearer_token(token: &str, issuer_url: &str, client_id: &str) -> bool {
    let claims = match decode_jwt_from_string(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("cached token rejected: {}", e);
            return false;
        }
    };

    let Some(exp) = claims.exp else {
        debug!("cached token rejected: no exp claim");
        return false;
    };
    if exp <= now_i64() {
        debug!(expired_at = exp, "cached token rejected: expired");
        return false;
    }
    if claims.iss.as_deref() != Some(issuer_url) {
        debug!("cached token rejected: issuer mismatch");
        return false;
    }

    let issued_for_client = claims.azp.as_deref() == Some(client_id)
        || claims.client_id.as_deref() == Some(client_id)
        || claims.aud.as_ref().is_some_and(|aud| aud.contains(client_id));
    if !issued_for_client {
        debug!("cached token rejected: audience mismatch");
    }
    issued_for_client
}
