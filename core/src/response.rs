//! The value every successful call returns.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::codec::{decode_as, Codec, JsonCodec};
use crate::error::RestError;
use crate::headers::Headers;

/// Status, headers and raw body of one HTTP exchange, plus the codec used to
/// read the body into typed values.
///
/// Equality and hashing only look at the status code and the body text.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: String,
    codec: Arc<dyn Codec>,
}

impl Response {
    /// A response with no headers, bound to the default `JsonCodec`.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
            codec: Arc::new(JsonCodec::new()),
        }
    }

    pub(crate) fn from_parts(
        status: u16,
        headers: Headers,
        body: String,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            codec,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw body text; empty when the server sent none.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of the header `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Read the body as a single `T`.
    pub fn object<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        self.for_type()
    }

    /// Read the body as a JSON array of `T`.
    pub fn object_list<T: DeserializeOwned>(&self) -> Result<Vec<T>, RestError> {
        self.for_type()
    }

    /// Read the body into any target type, including nested generic ones
    /// such as `HashMap<String, Vec<String>>`.
    pub fn for_type<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        self.object_with(self.codec.as_ref())
    }

    /// Like `object`, but decoding with `codec` instead of the bound one.
    pub fn object_with<T: DeserializeOwned>(&self, codec: &dyn Codec) -> Result<T, RestError> {
        decode_as(codec, &self.body).map_err(|source| RestError::Deserialization { source })
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.body == other.body
    }
}

impl Eq for Response {}

impl Hash for Response {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.status.hash(state);
        self.body.hash(state);
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.status, self.body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;
    use crate::headers::{APPLICATION_JSON, CONTENT_TYPE};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Company {
        name: String,
        number: i32,
    }

    fn hash_of(response: &Response) -> u64 {
        let mut hasher = DefaultHasher::new();
        response.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn empty_body_differs_from_literal_null() {
        assert_ne!(Response::new(200, ""), Response::new(200, "null"));
    }

    #[test]
    fn equality_ignores_headers_and_codec() {
        let plain = Response::new(200, "{}");
        let decorated = Response::new(200, "{}")
            .with_headers(Headers::from_iter([("X-Served-By", "a")]))
            .with_codec(Arc::new(JsonCodec::pretty()));
        assert_eq!(plain, decorated);
        assert_eq!(hash_of(&plain), hash_of(&decorated));
        assert_ne!(plain, Response::new(201, "{}"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = Response::new(200, "")
            .with_headers(Headers::from_iter([("content-type", APPLICATION_JSON)]));
        assert_eq!(response.header(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn header_lookup_without_headers_is_none() {
        assert_eq!(Response::new(200, "").header(CONTENT_TYPE), None);
    }

    #[test]
    fn object_reads_single_value() {
        let response = Response::new(200, r#"{"name":"ABC","number":123}"#);
        let company: Company = response.object().unwrap();
        assert_eq!(company.name, "ABC");
        assert_eq!(company.number, 123);
    }

    #[test]
    fn object_list_reads_array() {
        let response = Response::new(200, r#"[{"name":"A","number":1},{"name":"B","number":2}]"#);
        let companies: Vec<Company> = response.object_list().unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[1].name, "B");
    }

    #[test]
    fn for_type_reads_nested_generic_type() {
        let response = Response::new(200, r#"{"one":["foo"],"two":["foo","bar"]}"#);
        let map: HashMap<String, Vec<String>> = response.for_type().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["two"][1], "bar");
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        let err = Response::new(200, "<html>").object::<Company>().unwrap_err();
        assert!(matches!(err, RestError::Deserialization { .. }));
    }

    #[test]
    fn display_shows_status_and_body() {
        assert_eq!(Response::new(204, "").to_string(), "204, ");
        assert_eq!(Response::new(200, "ok").to_string(), "200, ok");
    }

    #[test]
    fn is_success_covers_2xx_only() {
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(304, "").is_success());
    }
}
