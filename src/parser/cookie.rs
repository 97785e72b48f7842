use crate::error::{ClientError, Result};

/// Token parts carried by the issuer's `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCookie {
    /// `<cookie-name>=<token>`, ready for a `Cookie` request header
    pub header_value: String,
    /// bare token, starting at offset `cookie-name.len() + 1`
    pub raw_token: String,
}

/// Split `<name>=<token>;<attributes>` at the first `;`.
///
/// The raw token is taken at the fixed offset of the `<name>=` prefix, so the
/// cookie must really start with that prefix.
pub fn split_token_cookie(set_cookie: &str, cookie_name: &str) -> Result<TokenCookie> {
    let header_value = match set_cookie.find(';') {
        Some(end) => &set_cookie[..end],
        None => set_cookie,
    };

    let offset = cookie_name.len() + 1;
    let has_prefix = header_value.len() >= offset
        && header_value.starts_with(cookie_name)
        && header_value.as_bytes()[cookie_name.len()] == b'=';
    if !has_prefix {
        return Err(ClientError::MalformedCookie(format!(
            "expected cookie '{}' in Set-Cookie header",
            cookie_name
        )));
    }

    let raw_token = &header_value[offset..];
    if raw_token.is_empty() {
        return Err(ClientError::MalformedCookie(format!("cookie '{}' has no value", cookie_name)));
    }

    Ok(TokenCookie {
        header_value: header_value.to_owned(),
        raw_token: raw_token.to_owned(),
    })
}
