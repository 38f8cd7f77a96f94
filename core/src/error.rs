//! Error types for the REST client.
//!
//! # Design
//! Every failure surfaces as a `RestError`. Each variant keeps the message
//! content a caller needs (method, URL, status, trimmed error body) and, where
//! an underlying failure exists, exposes it through `source()` so callers can
//! walk the cause chain instead of parsing message text.

use std::error::Error as StdError;

use thiserror::Error;

use crate::http::Method;

/// Upper bound on how much of an error body is embedded in a `Status` message.
const MAX_ERROR_BODY_IN_MESSAGE: usize = 1024;

/// Errors returned by `RestClient` and `Response`.
#[derive(Debug, Error)]
pub enum RestError {
    /// The connection could not be opened, or writing the request / reading
    /// the response failed at the I/O level.
    #[error("failed to call {method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The TLS trust material could not be resolved when building the client.
    #[error("failed to configure TLS trust: {message}")]
    TrustConfiguration {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The server answered with a failure status (>= 400, or anything but 200
    /// for the raw content helpers).
    #[error("{method} {url} failed with HTTP {status}{}", body_suffix(.body))]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    /// The request payload could not be converted to its wire format.
    #[error("failed to serialize payload for {method} {url}: {source}")]
    Serialization {
        method: Method,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response body could not be parsed into the requested type.
    #[error("failed to deserialize response body: {source}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
    },

    /// A helper was called with arguments it cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RestError {
    pub(crate) fn transport(method: Method, url: &str, source: ureq::Error) -> Self {
        RestError::Transport {
            method,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn status(method: Method, url: &str, status: u16, body: &str) -> Self {
        RestError::Status {
            method,
            url: url.to_string(),
            status,
            body: body.trim().to_string(),
        }
    }

    pub(crate) fn serialization(method: Method, url: &str, source: serde_json::Error) -> Self {
        RestError::Serialization {
            method,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn trust(message: impl Into<String>) -> Self {
        RestError::TrustConfiguration {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn trust_with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        RestError::TrustConfiguration {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// The HTTP status code, when this error was caused by a failure status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The trimmed error body returned with a failure status.
    pub fn error_body(&self) -> Option<&str> {
        match self {
            RestError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, RestError::Status { .. })
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    match body.char_indices().nth(MAX_ERROR_BODY_IN_MESSAGE) {
        Some((cut, _)) => format!(": {}...", &body[..cut]),
        None => format!(": {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_contains_method_url_status_and_trimmed_body() {
        let err = RestError::status(Method::Get, "http://localhost/x", 500, "  boom \n");
        assert_eq!(err.to_string(), "GET http://localhost/x failed with HTTP 500: boom");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.error_body(), Some("boom"));
    }

    #[test]
    fn status_message_without_body_has_no_suffix() {
        let err = RestError::status(Method::Delete, "http://localhost/company/1", 404, "");
        assert_eq!(err.to_string(), "DELETE http://localhost/company/1 failed with HTTP 404");
    }

    #[test]
    fn long_error_body_is_truncated_in_message_only() {
        let body = "x".repeat(MAX_ERROR_BODY_IN_MESSAGE + 50);
        let err = RestError::status(Method::Post, "http://h", 400, &body);
        let msg = err.to_string();
        assert!(msg.ends_with("..."));
        assert!(msg.len() < body.len() + 40);
        assert_eq!(err.error_body().map(str::len), Some(body.len()));
    }

    #[test]
    fn serialization_error_keeps_cause() {
        let cause = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = RestError::serialization(Method::Put, "http://h/p", cause);
        assert!(err.to_string().starts_with("failed to serialize payload for PUT http://h/p"));
        assert!(err.source().is_some());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn trust_error_without_cause_has_no_source() {
        let err = RestError::trust("no certificates");
        assert_eq!(err.to_string(), "failed to configure TLS trust: no certificates");
        assert!(err.source().is_none());
    }

    #[test]
    fn trust_error_with_cause_exposes_it() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = RestError::trust_with_cause("cannot read ca.pem", io);
        assert!(err.source().unwrap().to_string().contains("missing"));
    }
}
