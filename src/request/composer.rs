use std::collections::HashMap;

use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, Result};
use crate::utils::constants::APPLICATION_JSON;

/// One outbound call to a registered api, built per invocation.
#[derive(Debug, Clone, Default)]
pub struct ApiCall {
    pub api_name: String,
    pub path_segments: Vec<Option<String>>,
    /// comma-separated names, zipped with `query_param_value`
    pub query_param_name: Option<String>,
    pub query_param_value: Option<String>,
    pub media_type: Option<String>,
}

impl ApiCall {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self { api_name: api_name.into(), ..Default::default() }
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segments.push(Some(segment.into()));
        self
    }

    /// Append segments as given; `None` and empty entries are skipped at build time.
    pub fn segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.path_segments.extend(segments.into_iter().map(|s| s.map(Into::into)));
        self
    }

    pub fn query(mut self, names: impl Into<String>, values: impl Into<String>) -> Self {
        self.query_param_name = Some(names.into());
        self.query_param_value = Some(values.into());
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Body of a POST: nothing, a bare payload, or a payload with its own headers.
#[derive(Debug, Clone)]
pub enum RequestBody<B> {
    Empty,
    Raw(B),
    Wrapped { headers: HeaderMap, body: B },
}

/// Headers and serialized body ready to hand to the transport.
#[derive(Debug)]
pub struct ComposedRequest {
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

pub fn resolve_base_url<'a>(apis: &'a HashMap<String, String>, api_name: &str) -> Result<&'a str> {
    apis.get(api_name)
        .map(String::as_str)
        .ok_or_else(|| ClientError::UnknownApi(api_name.to_owned()))
}

/// Base url + non-empty segments + zipped query parameters.
pub fn build_uri(base_url: &str, call: &ApiCall) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;

    let segments: Vec<&str> = call
        .path_segments
        .iter()
        .filter_map(|s| s.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    if !segments.is_empty() {
        let mut path = url.path_segments_mut().map_err(|_| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            reason: "cannot be a base".to_owned(),
        })?;
        path.pop_if_empty().extend(segments);
    }

    let pairs = query_pairs(call.query_param_name.as_deref(), call.query_param_value.as_deref())?;
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}

/// Split comma-joined names and values and zip them positionally.
pub fn query_pairs<'a>(names: Option<&'a str>, values: Option<&'a str>) -> Result<Vec<(&'a str, &'a str)>> {
    let Some(names) = names.filter(|n| !n.is_empty()) else {
        return Ok(Vec::new());
    };
    let names = split_list(names);
    let values = split_list(values.unwrap_or(""));
    if names.len() != values.len() {
        return Err(ClientError::QueryParamMismatch { names: names.len(), values: values.len() });
    }

    Ok(names
        .into_iter()
        .zip(values)
        .filter(|(name, _)| !name.is_empty())
        .collect())
}

/// Comma split that drops trailing empty entries, so `"1,2,"` is two values.
fn split_list(list: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = list.split(',').collect();
    while parts.len() > 1 && parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}

/// Token cookie, content type and the caller's wrapper headers, plus the JSON body.
pub fn compose<B: Serialize>(
    token: &str,
    media_type: Option<&str>,
    body: RequestBody<B>,
) -> Result<ComposedRequest> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, header_value(COOKIE.as_str(), token)?);
    if let Some(media_type) = media_type {
        headers.insert(CONTENT_TYPE, header_value(CONTENT_TYPE.as_str(), media_type)?);
    }

    let payload = match body {
        RequestBody::Empty => None,
        RequestBody::Raw(body) => Some(serde_json::to_vec(&body)?),
        RequestBody::Wrapped { headers: extra, body } => {
            merge_headers(&mut headers, &extra);
            Some(serde_json::to_vec(&body)?)
        }
    };

    if payload.is_some() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    }

    Ok(ComposedRequest { headers, body: payload })
}

/// First value of every wrapper header; content type only when still unset.
fn merge_headers(headers: &mut HeaderMap, extra: &HeaderMap) {
    let had_content_type = headers.contains_key(CONTENT_TYPE);
    for name in extra.keys() {
        if name == CONTENT_TYPE && had_content_type {
            continue;
        }
        if let Some(value) = extra.get(name) {
            headers.append(name.clone(), value.clone());
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.to_owned()))
}

/// Parse a caller header pair, mainly for building `RequestBody::Wrapped`.
pub fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidHeader(name.to_owned()))?;
    Ok((header_name, header_value(name, value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn skips_empty_and_missing_segments() {
        let call = ApiCall::new("IDREPO").segments(vec![Some("a"), Some(""), Some("b"), None]);
        let url = build_uri("http://idrepo.local/v1/identity", &call).unwrap();
        assert_eq!(url.as_str(), "http://idrepo.local/v1/identity/a/b");
    }

    #[test]
    fn trailing_slash_base_does_not_double_up() {
        let call = ApiCall::new("IDREPO").segment("uin").segment("1234");
        let url = build_uri("http://idrepo.local/v1/", &call).unwrap();
        assert_eq!(url.path(), "/v1/uin/1234");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let call = ApiCall::new("IDREPO").segment("a b/c");
        let url = build_uri("http://idrepo.local", &call).unwrap();
        assert_eq!(url.path(), "/a%20b%2Fc");
    }

    #[test]
    fn zips_query_names_and_values() {
        let call = ApiCall::new("IDREPO").query("x,y", "1,2");
        let url = build_uri("http://idrepo.local/v1", &call).unwrap();
        assert_eq!(url.query(), Some("x=1&y=2"));
    }

    #[test]
    fn empty_query_names_add_nothing() {
        let call = ApiCall { query_param_name: Some("".into()), ..ApiCall::new("IDREPO") };
        let url = build_uri("http://idrepo.local/v1", &call).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn mismatched_query_lengths_fail_fast() {
        let err = query_pairs(Some("x,y"), Some("1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, ClientError::QueryParamMismatch { names: 2, values: 1 }));
    }

    #[test]
    fn trailing_commas_do_not_count_as_entries() {
        let pairs = query_pairs(Some("x,y"), Some("1,2,")).unwrap();
        assert_eq!(pairs, vec![("x", "1"), ("y", "2")]);

        let pairs = query_pairs(Some("x,,"), Some("1")).unwrap();
        assert_eq!(pairs, vec![("x", "1")]);

        // inner empty values still count
        let pairs = query_pairs(Some("x,y"), Some(",2")).unwrap();
        assert_eq!(pairs, vec![("x", ""), ("y", "2")]);
    }

    #[test]
    fn unknown_api_is_configuration_error() {
        let apis = HashMap::from([("IDREPO".to_string(), "http://idrepo.local".to_string())]);
        assert_eq!(resolve_base_url(&apis, "IDREPO").unwrap(), "http://idrepo.local");
        let err = resolve_base_url(&apis, "NOPE").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn raw_body_gets_token_and_media_type() {
        let composed = compose("Authorization=t0k", Some("application/json"), RequestBody::Raw(json!({"a": 1}))).unwrap();
        assert_eq!(composed.headers[COOKIE], "Authorization=t0k");
        assert_eq!(composed.headers[CONTENT_TYPE], "application/json");
        assert_eq!(composed.body.unwrap(), br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn wrapped_headers_merge_without_overriding_content_type() {
        let mut extra = HeaderMap::new();
        let (name, value) = header_pair("x-request-id", "42").unwrap();
        extra.insert(name, value);
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let composed = compose(
            "Authorization=t0k",
            Some("application/json"),
            RequestBody::Wrapped { headers: extra, body: json!({"b": 2}) },
        )
        .unwrap();

        assert_eq!(composed.headers["x-request-id"], "42");
        assert_eq!(composed.headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(composed.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn wrapped_content_type_used_when_unset() {
        let mut extra = HeaderMap::new();
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));

        let composed = compose("Authorization=t0k", None, RequestBody::Wrapped { headers: extra, body: "x" }).unwrap();
        assert_eq!(composed.headers[CONTENT_TYPE], "application/xml");
    }

    #[test]
    fn empty_body_has_only_token() {
        let composed = compose::<()>("Authorization=t0k", None, RequestBody::Empty).unwrap();
        assert_eq!(composed.headers.len(), 1);
        assert!(composed.body.is_none());
    }
}
