//! Request-side types: the verb set, payloads, per-call options and the
//! descriptor a call is built into before it touches the network.
//!
//! # Design
//! `RestClient::build` turns a method, URL, optional payload and
//! `RequestOptions` into a `RequestDescriptor` without doing any I/O, so the
//! header and body rules can be checked in isolation. Dispatch only reads the
//! finished descriptor.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::codec::Codec;
use crate::headers::Headers;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// HEAD and OPTIONS never write a request body.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Method::Head | Method::Options)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent verbatim.
    Text(String),
    /// Encoded through the client's codec.
    Json(serde_json::Value),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Capture any serializable value as a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Payload::Json)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// Marks a value to be sent as JSON through the client's codec.
///
/// `client.post(url, Json(&company), &options)`. Plain `&str` and `String`
/// payloads are sent verbatim instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Anything a verb method accepts as a request body.
pub trait IntoPayload {
    fn into_payload(self) -> Result<Payload, serde_json::Error>;
}

impl IntoPayload for Payload {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(self)
    }
}

impl IntoPayload for &Payload {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(self.clone())
    }
}

impl IntoPayload for &str {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(Payload::text(self))
    }
}

impl IntoPayload for String {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(Payload::Text(self))
    }
}

impl IntoPayload for &String {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(Payload::text(self.as_str()))
    }
}

impl IntoPayload for serde_json::Value {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Ok(Payload::Json(self))
    }
}

impl<T: Serialize> IntoPayload for Json<T> {
    fn into_payload(self) -> Result<Payload, serde_json::Error> {
        Payload::json(&self.0)
    }
}

/// Optional per-call settings. `RequestOptions::default()` means no extra
/// headers, `Accept: application/json` and the client's codec.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Headers,
    pub accept: Option<String>,
    pub codec: Option<Arc<dyn Codec>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any earlier value with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a whole header collection. A name present in `headers` takes
    /// all of its values from there, repeated values included.
    pub fn headers(mut self, headers: Headers) -> Self {
        for name in headers.names() {
            let mut values = headers.get_all(name).iter();
            if let Some(first) = values.next() {
                self.headers.insert(name, first.as_str());
            }
            for value in values {
                self.headers.append(name, value.as_str());
            }
        }
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept = Some(media_type.into());
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }
}

/// One outbound call described as plain data.
///
/// Built by `RestClient::build`; `body` already holds the encoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub accept: String,
    pub body: Option<String>,
}
