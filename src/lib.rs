//! # Token REST Client Library
//!
//! Calls sibling services over HTTP, authenticating every call with a bearer
//! token obtained through a secret-key exchange and cached between calls.
//!
//! Modules:
//! - `config` — client configuration, loading and validation
//! - `cache` — token store with local validation and single-flight refresh
//! - `sources` — secret-key token exchange against the issuer
//! - `parser` — `Set-Cookie` splitting and JWT claim checks
//! - `request` — uri, header and body composition
//! - `client` — GET/POST invoker with typed responses
//! - `transport` — reqwest client factory and trust policy

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod request;
pub mod sources;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::rest_client::RestClient;
pub use crate::error::{ClientError, ErrorKind};
pub use crate::request::composer::{ApiCall, RequestBody};
