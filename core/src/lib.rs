//! Small blocking REST client.
//!
//! # Overview
//! Issues GET/POST/PUT/DELETE/HEAD/OPTIONS calls, sends payloads as JSON and
//! returns a `Response` holding status, headers and raw body, with helpers to
//! read the body into typed values.
//!
//! # Design
//! - `RestClient` is built once (trust material, codec, user agent) and is
//!   read-only afterwards; it can be shared across threads.
//! - Every call opens exactly one connection and releases it before
//!   returning. No pooling, no retries, no timeouts.
//! - A call is first built into a `RequestDescriptor` without I/O, then
//!   dispatched, so header and body rules are testable offline.
//! - Statuses >= 400 are errors (`RestError::Status`) carrying method, URL,
//!   status and the trimmed error body.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod params;
pub mod response;
pub mod trust;

pub use client::RestClient;
pub use codec::{Codec, JsonCodec};
pub use config::ClientConfig;
pub use error::RestError;
pub use headers::{basic_auth, basic_auth_header, bearer, bearer_header, Headers};
pub use http::{IntoPayload, Json, Method, Payload, RequestDescriptor, RequestOptions};
pub use params::parameters;
pub use response::Response;
pub use trust::{TrustMode, TrustPolicy};
