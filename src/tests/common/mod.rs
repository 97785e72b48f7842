// tests/common/mod.rs
use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::settings::{ClientConfig, SettingsConfig, TokenConfig, TokenRequestConfig};
use crate::helpers::time::now_i64;

pub const ISSUER: &str = "https://issuer.local/auth/realms/mosip";
pub const CLIENT_ID: &str = "digitalcard";

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn token_config(exchange_url: &str) -> TokenConfig {
    TokenConfig {
        exchange_url: exchange_url.to_owned(),
        cookie_name: "Authorization".to_owned(),
        request: TokenRequestConfig {
            id: "mosip.io.clientId.pwd".to_owned(),
            version: "1.0".to_owned(),
            issuer_url: ISSUER.to_owned(),
            client_id: CLIENT_ID.to_owned(),
            app_id: "regproc".to_owned(),
            secret_key: "s3cr3t".to_owned(),
        },
    }
}

pub fn client_config(exchange_url: &str, apis: &[(&str, String)]) -> ClientConfig {
    ClientConfig {
        settings: SettingsConfig::default(),
        token: token_config(exchange_url),
        apis: apis
            .iter()
            .map(|(name, url)| (name.to_string(), url.to_owned()))
            .collect::<HashMap<_, _>>(),
    }
}

/// Unsigned JWT carrying the given payload.
pub fn sample_jwt(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.sig", header, payload)
}

/// JWT the token store accepts for [`ISSUER`] / [`CLIENT_ID`].
pub fn valid_jwt() -> String {
    sample_jwt(json!({"exp": now_i64() + 600, "iss": ISSUER, "azp": CLIENT_ID}))
}

/// HTTPS listener on 127.0.0.1 presenting a freshly generated self-signed
/// certificate. Answers every request with `200 {"ok":true}`. Returns the base url.
pub async fn start_self_signed_server() -> String {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_rustls::rustls::crypto::ring::default_provider;
    use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use tokio_rustls::rustls::ServerConfig;
    use tokio_rustls::TlsAcceptor;

    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
        .expect("self-signed cert");
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));
    let server_config = ServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .expect("tls versions")
        .with_no_client_auth()
        .with_single_cert(vec![certified.cert.der().clone()], key)
        .expect("server config");
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind tls listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // clients that reject the certificate fail the handshake here
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let body = r#"{"ok":true}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://127.0.0.1:{}", addr.port())
}
