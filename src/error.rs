use http::StatusCode;
use thiserror::Error;

/// Broad failure category, used by callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Protocol,
    Serialization,
}

/// Every failure surfaced by the token store, the exchange client and the API invoker.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Logical API name has no base URL in configuration.
    #[error("resource access failed: unknown api name '{0}'")]
    UnknownApi(String),

    #[error("resource access failed: invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Comma-separated query names and values have different lengths.
    #[error("resource access failed: {names} query param names but {values} values")]
    QueryParamMismatch { names: usize, values: usize },

    #[error("resource access failed: invalid header '{0}'")]
    InvalidHeader(String),

    #[error("resource access failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("resource access failed: {url} responded with {status}")]
    Status { url: String, status: StatusCode },

    /// Token exchange answered without a `Set-Cookie` header.
    #[error("token issuance produced no credential")]
    MissingCredential,

    #[error("token cookie is malformed: {0}")]
    MalformedCookie(String),

    #[error("resource access failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Config(_)
            | ClientError::UnknownApi(_)
            | ClientError::InvalidUrl { .. }
            | ClientError::QueryParamMismatch { .. }
            | ClientError::InvalidHeader(_) => ErrorKind::Configuration,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Status { .. }
            | ClientError::MissingCredential
            | ClientError::MalformedCookie(_) => ErrorKind::Protocol,
            ClientError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
