//! Blocking REST client.
//!
//! # Design
//! `RestClient` holds only what is fixed at construction: the agent built
//! from the resolved `TrustPolicy`, the shared codec and the default
//! `User-Agent`. Each call is split into `build` (pure: produces a
//! `RequestDescriptor`) and dispatch (one connection, opened and dropped
//! within the call). The agent keeps no idle connections, so releasing the
//! response releases the socket on every exit path.
//!
//! Calls block the calling thread until they complete or fail. There is no
//! cancellation and no timeout.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use ureq::http::HeaderMap;
use ureq::{Agent, Body, RequestBuilder};

use crate::codec::{Codec, JsonCodec};
use crate::config::ClientConfig;
use crate::error::RestError;
use crate::headers::{Headers, ACCEPT, APPLICATION_JSON, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use crate::http::{IntoPayload, Method, Payload, RequestDescriptor, RequestOptions};
use crate::response::Response;
use crate::trust::TrustPolicy;

/// Statuses at or above this are call failures.
const FAILURE_THRESHOLD: u16 = 400;

type RawResponse = ureq::http::Response<Body>;

/// Synchronous client issuing one connection per call.
///
/// Cheap to clone and safe to share between threads; it carries no
/// per-call state.
#[derive(Clone)]
pub struct RestClient {
    agent: Agent,
    trust: TrustPolicy,
    codec: Arc<dyn Codec>,
    user_agent: Option<String>,
}

impl RestClient {
    /// Client with platform trust and default settings.
    pub fn new() -> Result<Self, RestError> {
        Self::from_config(&ClientConfig::default())
    }

    /// Client with default settings and the given trust material.
    pub fn with_trust(trust: TrustPolicy) -> Self {
        Self::assemble(trust, &ClientConfig::default())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, RestError> {
        let trust = config.trust_policy()?;
        Ok(Self::assemble(trust, config))
    }

    fn assemble(trust: TrustPolicy, config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .max_redirects(config.max_redirects)
            .tls_config(trust.tls_config())
            .build()
            .new_agent();
        Self {
            agent,
            trust,
            codec: Arc::new(JsonCodec::new()),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Replace the codec every call and response uses by default.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn trust_policy(&self) -> &TrustPolicy {
        &self.trust
    }

    pub fn get(&self, url: &str, options: &RequestOptions) -> Result<Response, RestError> {
        self.execute(Method::Get, url, None, options)
    }

    /// GET with a request body. HTTP gives such a body no meaning; this
    /// exists for servers that expect one anyway.
    pub fn get_with_body(
        &self,
        url: &str,
        payload: impl IntoPayload,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        self.execute_payload(Method::Get, url, payload, options)
    }

    /// POST `payload`: `&str`/`String` verbatim, `Json(..)` through the codec.
    pub fn post(
        &self,
        url: &str,
        payload: impl IntoPayload,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        self.execute_payload(Method::Post, url, payload, options)
    }

    pub fn put(
        &self,
        url: &str,
        payload: impl IntoPayload,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        self.execute_payload(Method::Put, url, payload, options)
    }

    pub fn delete(&self, url: &str, options: &RequestOptions) -> Result<Response, RestError> {
        self.execute(Method::Delete, url, None, options)
    }

    pub fn delete_with_body(
        &self,
        url: &str,
        payload: impl IntoPayload,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        self.execute_payload(Method::Delete, url, payload, options)
    }

    /// Status and headers only.
    pub fn head(&self, url: &str, options: &RequestOptions) -> Result<Response, RestError> {
        self.execute(Method::Head, url, None, options)
    }

    /// Status and headers only; the supported methods are in `Allow`.
    pub fn options(&self, url: &str, options: &RequestOptions) -> Result<Response, RestError> {
        self.execute(Method::Options, url, None, options)
    }

    fn execute_payload(
        &self,
        method: Method,
        url: &str,
        payload: impl IntoPayload,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        let payload = payload
            .into_payload()
            .map_err(|source| RestError::serialization(method, url, source))?;
        self.execute(method, url, Some(&payload), options)
    }

    /// Run one call. Statuses >= 400 come back as `RestError::Status`.
    pub fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<Response, RestError> {
        let mut raw = self.open(method, url, payload, options)?;
        let status = raw.status().as_u16();
        let headers = collect_headers(raw.headers());

        let body = if status >= FAILURE_THRESHOLD {
            read_text(&mut raw, &headers).unwrap_or_else(|error| {
                debug!(%method, url, status, %error, "could not read error body");
                String::new()
            })
        } else {
            read_text(&mut raw, &headers).map_err(|source| RestError::transport(method, url, source))?
        };
        debug!(%method, url, status, bytes = body.len(), "received response");

        if status >= FAILURE_THRESHOLD {
            return Err(RestError::status(method, url, status, &body));
        }
        let codec = options.codec.clone().unwrap_or_else(|| Arc::clone(&self.codec));
        Ok(Response::from_parts(status, headers, body, codec))
    }

    /// Fetch `url` as raw bytes. Anything but 200 is an error.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RestError> {
        let mut raw = self.open(Method::Get, url, None, &any_content())?;
        let status = raw.status().as_u16();
        if status != 200 {
            let body = raw.body_mut().read_to_string().unwrap_or_default();
            return Err(RestError::status(Method::Get, url, status, &body));
        }
        raw.body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|source| RestError::transport(Method::Get, url, source))
    }

    /// `get_bytes` encoded as standard padded base64.
    pub fn get_base64(&self, url: &str) -> Result<String, RestError> {
        Ok(STANDARD.encode(self.get_bytes(url)?))
    }

    /// True when `url` answers 200 with an `image/*` content type. Every
    /// failure counts as "not an image".
    pub fn is_image(&self, url: &str) -> bool {
        match self.open(Method::Get, url, None, &any_content()) {
            Ok(raw) => {
                let headers = collect_headers(raw.headers());
                raw.status().as_u16() == 200
                    && headers
                        .get(CONTENT_TYPE)
                        .is_some_and(|content_type| content_type.starts_with("image"))
            }
            Err(error) => {
                debug!(url, %error, "image probe failed");
                false
            }
        }
    }

    /// Describe a call without performing it.
    ///
    /// Defaults come first (`Accept`, `User-Agent`, and `Content-Type` when
    /// there is a body); caller headers replace defaults of the same name.
    /// HEAD and OPTIONS drop any payload.
    pub fn build(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<RequestDescriptor, RestError> {
        let codec = options.codec.as_deref().unwrap_or(self.codec.as_ref());
        let body = match payload {
            Some(_) if !method.allows_body() => {
                debug!(%method, url, "ignoring payload, method carries no body");
                None
            }
            Some(Payload::Text(text)) => Some(text.clone()),
            Some(Payload::Json(value)) => Some(
                codec
                    .encode(value)
                    .map_err(|source| RestError::serialization(method, url, source))?,
            ),
            None => None,
        };

        let mut defaults = Headers::new();
        defaults.insert(ACCEPT, options.accept.as_deref().unwrap_or(APPLICATION_JSON));
        if let Some(user_agent) = &self.user_agent {
            defaults.insert(USER_AGENT, user_agent.as_str());
        }
        if body.is_some() {
            defaults.insert(CONTENT_TYPE, APPLICATION_JSON);
        }

        let mut headers: Headers = defaults
            .iter()
            .filter(|(name, _)| !options.headers.contains(name))
            .collect();
        for (name, value) in options.headers.iter() {
            headers.append(name, value);
        }
        let accept = headers.get(ACCEPT).unwrap_or(APPLICATION_JSON).to_string();

        Ok(RequestDescriptor {
            method,
            url: url.to_string(),
            headers,
            accept,
            body,
        })
    }

    fn open(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<RawResponse, RestError> {
        let request = self.build(method, url, payload, options)?;
        debug!(%method, url, has_body = request.body.is_some(), "sending request");
        self.dispatch(&request)
            .map_err(|source| RestError::transport(method, url, source))
    }

    fn dispatch(&self, request: &RequestDescriptor) -> Result<RawResponse, ureq::Error> {
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);
        match (request.method, body) {
            (Method::Get, None) => with_headers(self.agent.get(url), request).call(),
            (Method::Get, Some(body)) => with_headers(self.agent.get(url), request)
                .force_send_body()
                .send(body),
            (Method::Delete, None) => with_headers(self.agent.delete(url), request).call(),
            (Method::Delete, Some(body)) => with_headers(self.agent.delete(url), request)
                .force_send_body()
                .send(body),
            (Method::Post, None) => with_headers(self.agent.post(url), request).send_empty(),
            (Method::Post, Some(body)) => with_headers(self.agent.post(url), request).send(body),
            (Method::Put, None) => with_headers(self.agent.put(url), request).send_empty(),
            (Method::Put, Some(body)) => with_headers(self.agent.put(url), request).send(body),
            (Method::Head, _) => with_headers(self.agent.head(url), request).call(),
            (Method::Options, _) => with_headers(self.agent.options(url), request).call(),
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("trust", &self.trust)
            .field("codec", &self.codec)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn any_content() -> RequestOptions {
    RequestOptions::new().accept("*/*")
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &RequestDescriptor) -> RequestBuilder<B> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

fn collect_headers(map: &HeaderMap) -> Headers {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Read the body, skipping the read when the server declared it empty.
/// There is no size cap.
fn read_text(raw: &mut RawResponse, headers: &Headers) -> Result<String, ureq::Error> {
    if headers
        .get(CONTENT_LENGTH)
        .is_some_and(|length| length.trim() == "0")
    {
        return Ok(String::new());
    }
    raw.body_mut().with_config().limit(u64::MAX).read_to_string()
}
