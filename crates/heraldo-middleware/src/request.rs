//! Decoded request view seen by validation stages and handlers.
//!
//! The pipeline decodes an incoming [`Request`] once, up front, into an
//! [`ApiRequest`] holding three JSON containers (body, query and path
//! parameters). Validation stages read and replace these containers; the
//! handler receives the request after every stage has run.

use heraldo_core::{PipelineFailure, PipelineResult, ValidationTarget};
use http::{HeaderMap, Method, Uri};
use http_body_util::{BodyExt, Limited};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::Request;

/// Path parameters captured by the host router, in capture order.
///
/// # Example
///
/// ```
/// use heraldo_middleware::PathParams;
///
/// let params: PathParams = [("id", "42")].into_iter().collect();
/// assert_eq!(params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the parameters into a JSON object of strings.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map = self
            .0
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A request after body, query and path decoding.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Value,
    query: Value,
    params: Value,
}

impl ApiRequest {
    /// Decodes an HTTP request.
    ///
    /// - A body larger than `max_body_bytes` fails with 413 "Payload too large"
    /// - An empty body decodes to `{}`
    /// - A body declared with a non-JSON `Content-Type` is not decoded and
    ///   becomes `{}`; a missing `Content-Type` is read as JSON
    /// - A JSON body that does not parse fails with 400 "Malformed JSON body"
    /// - A query string that cannot be form-decoded fails with 400
    ///   "Malformed query string"
    pub async fn from_http(
        request: Request,
        params: PathParams,
        max_body_bytes: usize,
    ) -> PipelineResult<Self> {
        let (parts, body) = request.into_parts();

        let bytes = Limited::new(body, max_body_bytes)
            .collect()
            .await
            .map_err(|_| PipelineFailure::with_status(413, "Payload too large"))?
            .to_bytes();

        let body = if declares_json(&parts.headers) {
            decode_body(&bytes)?
        } else {
            Value::Object(Map::new())
        };
        let query = decode_query(parts.uri.query())?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            query,
            params: params.to_value(),
        })
    }

    /// Builds a request from already-decoded parts.
    ///
    /// The query container is decoded from `uri`.
    pub fn from_parts(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Value,
        params: &PathParams,
    ) -> PipelineResult<Self> {
        let query = decode_query(uri.query())?;
        Ok(Self {
            method,
            uri,
            headers,
            body,
            query,
            params: params.to_value(),
        })
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the decoded body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the decoded query parameters.
    #[must_use]
    pub fn query(&self) -> &Value {
        &self.query
    }

    /// Returns the path parameters.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Returns the container a validation target refers to.
    #[must_use]
    pub fn target(&self, target: ValidationTarget) -> &Value {
        match target {
            ValidationTarget::Body => &self.body,
            ValidationTarget::Query => &self.query,
            ValidationTarget::Params => &self.params,
        }
    }

    /// Replaces a container, returning the previous value.
    pub fn replace_target(&mut self, target: ValidationTarget, value: Value) -> Value {
        let slot = match target {
            ValidationTarget::Body => &mut self.body,
            ValidationTarget::Query => &mut self.query,
            ValidationTarget::Params => &mut self.params,
        };
        std::mem::replace(slot, value)
    }

    /// Deserializes a container into a typed value.
    ///
    /// Meant for handlers reading a container that a validation stage has
    /// already normalized; a mismatch is a server-side bug and resolves to 500.
    pub fn target_as<T: DeserializeOwned>(&self, target: ValidationTarget) -> PipelineResult<T> {
        T::deserialize(self.target(target)).map_err(PipelineFailure::unclassified)
    }

    /// Deserializes the body into a typed value.
    pub fn body_as<T: DeserializeOwned>(&self) -> PipelineResult<T> {
        self.target_as(ValidationTarget::Body)
    }

    /// Deserializes the query parameters into a typed value.
    pub fn query_as<T: DeserializeOwned>(&self) -> PipelineResult<T> {
        self.target_as(ValidationTarget::Query)
    }

    /// Deserializes the path parameters into a typed value.
    pub fn params_as<T: DeserializeOwned>(&self) -> PipelineResult<T> {
        self.target_as(ValidationTarget::Params)
    }
}

/// Returns `true` if `media_type` is `application/json` or a `+json`
/// structured syntax type, ignoring parameters and case.
///
/// ```
/// use heraldo_middleware::request::is_json_media_type;
///
/// assert!(is_json_media_type("application/json; charset=utf-8"));
/// assert!(is_json_media_type("application/problem+json"));
/// assert!(!is_json_media_type("application/x-www-form-urlencoded"));
/// ```
#[must_use]
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || essence
            .split_once('/')
            .is_some_and(|(_, subtype)| subtype.ends_with("+json"))
}

fn declares_json(headers: &HeaderMap) -> bool {
    match headers.get(http::header::CONTENT_TYPE) {
        None => true,
        Some(value) => value.to_str().is_ok_and(is_json_media_type),
    }
}

/// Decodes a JSON body. Empty or whitespace-only bodies become `{}`.
pub fn decode_body(bytes: &[u8]) -> PipelineResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| PipelineFailure::bad_request("Malformed JSON body").with_source(e))
}

/// Decodes a form-encoded query string into a JSON object.
///
/// Every value is a string. A key that appears more than once becomes an
/// array of its values, in order.
pub fn decode_query(query: Option<&str>) -> PipelineResult<Value> {
    let mut map = Map::new();
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Ok(Value::Object(map));
    };

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| PipelineFailure::bad_request("Malformed query string").with_source(e))?;

    for (key, value) in pairs {
        let value = Value::String(value);
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }

    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::json;

    fn request(uri: &str, body: &'static str) -> Request {
        http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_decodes_body_query_and_params() {
        let params: PathParams = [("id", "42")].into_iter().collect();
        let api = ApiRequest::from_http(request("/users/42?page=2", r#"{"name":"Ada"}"#), params, 1024)
            .await
            .unwrap();

        assert_eq!(api.method(), &Method::POST);
        assert_eq!(api.path(), "/users/42");
        assert_eq!(api.body(), &json!({"name": "Ada"}));
        assert_eq!(api.query(), &json!({"page": "2"}));
        assert_eq!(api.params(), &json!({"id": "42"}));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_object() {
        let api = ApiRequest::from_http(request("/", ""), PathParams::new(), 1024)
            .await
            .unwrap();
        assert_eq!(api.body(), &json!({}));
        assert_eq!(api.query(), &json!({}));
        assert_eq!(api.params(), &json!({}));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let err = ApiRequest::from_http(request("/", r#"{"name":"Ada Lovelace"}"#), PathParams::new(), 8)
            .await
            .unwrap_err();
        assert_eq!(err.resolved_status().as_u16(), 413);
        assert_eq!(err.resolved_message("Internal error"), "Payload too large");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let err = ApiRequest::from_http(request("/", "{not json"), PathParams::new(), 1024)
            .await
            .unwrap_err();
        assert_eq!(err.resolved_status().as_u16(), 400);
        assert_eq!(err.resolved_message("Internal error"), "Malformed JSON body");
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_non_json_body_is_not_decoded() {
        let form = http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(b"a=b")))
            .unwrap();
        let api = ApiRequest::from_http(form, PathParams::new(), 1024)
            .await
            .unwrap();
        assert_eq!(api.body(), &json!({}));

        let problem = http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "Application/Problem+JSON; charset=utf-8")
            .body(Full::new(Bytes::from_static(b"{not json")))
            .unwrap();
        let err = ApiRequest::from_http(problem, PathParams::new(), 1024)
            .await
            .unwrap_err();
        assert_eq!(err.resolved_status().as_u16(), 400);
    }

    #[test]
    fn test_json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type(" APPLICATION/JSON ;charset=utf-8"));
        assert!(is_json_media_type("application/vnd.api+json"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type("multipart/form-data; boundary=x"));
        assert!(!is_json_media_type(""));
    }

    #[test]
    fn test_repeated_query_keys_become_arrays() {
        let query = decode_query(Some("tag=a&tag=b&tag=c&q=x%20y")).unwrap();
        assert_eq!(query, json!({"tag": ["a", "b", "c"], "q": "x y"}));
    }

    #[test]
    fn test_query_keeps_first_appearance_order() {
        let query = decode_query(Some("b=1&a=2&b=3")).unwrap();
        let keys: Vec<_> = query.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_replace_target() {
        let mut api = ApiRequest::from_parts(
            Method::GET,
            Uri::from_static("/items?limit=5"),
            HeaderMap::new(),
            json!({}),
            &PathParams::new(),
        )
        .unwrap();

        let previous = api.replace_target(ValidationTarget::Query, json!({"limit": 5}));
        assert_eq!(previous, json!({"limit": "5"}));
        assert_eq!(api.target(ValidationTarget::Query), &json!({"limit": 5}));
    }

    #[test]
    fn test_typed_access() {
        #[derive(Debug, serde::Deserialize)]
        struct Paging {
            limit: u32,
        }

        let mut api = ApiRequest::from_parts(
            Method::GET,
            Uri::from_static("/items"),
            HeaderMap::new(),
            json!({}),
            &PathParams::new(),
        )
        .unwrap();
        api.replace_target(ValidationTarget::Query, json!({"limit": 5}));

        let paging: Paging = api.query_as().unwrap();
        assert_eq!(paging.limit, 5);

        let err = api.body_as::<Paging>().unwrap_err();
        assert_eq!(err.resolved_status().as_u16(), 500);
    }
}
