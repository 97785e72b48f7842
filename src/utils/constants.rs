//! Shared constants and invariants

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30000;

/// Name of the issuer's session cookie. The cached raw token starts right
/// after `<name>=`, so the parse offset is always `name.len() + 1`.
pub const DEFAULT_TOKEN_COOKIE_NAME: &str = "Authorization";

pub const APPLICATION_JSON: &str = "application/json";
