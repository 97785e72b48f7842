//! Transport factory.
//!
//! Two clients exist: the api client, whose certificate trust follows the
//! configured [`TrustPolicy`], and the issuer client used for the token
//! exchange, which always verifies certificates against the system roots.
//! `accept_any_certificate` is meant for controlled internal networks where
//! sibling services present self-signed certificates; it must be chosen
//! explicitly in configuration.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::settings::{TransportConfig, TrustPolicy};
use crate::error::Result;

/// Client for downstream api calls.
pub fn build_api_client(transport: &TransportConfig) -> Result<Client> {
    let mut builder = base_builder(transport);
    match transport.trust_policy {
        TrustPolicy::System => {
            info!("api transport: system certificate trust");
        }
        TrustPolicy::AcceptAnyCertificate => {
            warn!("api transport: accepting any server certificate");
            builder = builder.danger_accept_invalid_certs(true);
        }
    }
    Ok(builder.build()?)
}

/// Plain client for the token exchange.
pub fn build_issuer_client(transport: &TransportConfig) -> Result<Client> {
    Ok(base_builder(transport).build()?)
}

fn base_builder(transport: &TransportConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_millis(transport.connect_timeout_ms))
        .timeout(Duration::from_millis(transport.request_timeout_ms))
}
