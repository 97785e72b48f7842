
/// Token held by the store. No expiry is kept; validity is decided from the
/// token's own claims every time it is reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw_value: String,
    pub issued_for_client_id: String,
    pub issuer_url: String,
}

impl Token {
    pub fn new(raw_value: String, issued_for_client_id: String, issuer_url: String) -> Self {
        Self { raw_value, issued_for_client_id, issuer_url }
    }
}
