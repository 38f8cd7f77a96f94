//! JSON codec used for request payloads and response bodies.
//!
//! # Design
//! The trait works on `serde_json::Value` so it stays object-safe and can be
//! shared as `Arc<dyn Codec>` between a client and every `Response` it
//! produces. Typed conversion happens on either side of it with serde.

use std::fmt;

use serde::de::DeserializeOwned;

/// Converts between structured values and their wire text.
///
/// Implementations must be immutable after construction; a client hands the
/// same instance to every call and thread.
pub trait Codec: fmt::Debug + Send + Sync {
    fn encode(&self, value: &serde_json::Value) -> Result<String, serde_json::Error>;

    fn decode(&self, text: &str) -> Result<serde_json::Value, serde_json::Error>;
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent encoded payloads.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, value: &serde_json::Value) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    fn decode(&self, text: &str) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Decode `text` with `codec` and convert the result into `T`.
pub(crate) fn decode_as<T: DeserializeOwned>(
    codec: &dyn Codec,
    text: &str,
) -> Result<T, serde_json::Error> {
    let value = codec.decode(text)?;
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Company {
        name: String,
        number: i32,
    }

    #[test]
    fn compact_encoding_by_default() {
        let value = serde_json::json!({"name": "ABC", "number": 123});
        assert_eq!(
            JsonCodec::new().encode(&value).unwrap(),
            r#"{"name":"ABC","number":123}"#
        );
    }

    #[test]
    fn pretty_encoding_spans_lines() {
        let value = serde_json::json!({"name": "ABC"});
        let text = JsonCodec::pretty().encode(&value).unwrap();
        assert!(text.contains('\n'));
    }

    #[test]
    fn decode_as_typed_value() {
        let company: Company =
            decode_as(&JsonCodec::new(), r#"{"name":"ABC","number":123}"#).unwrap();
        assert_eq!(
            company,
            Company {
                name: "ABC".to_string(),
                number: 123
            }
        );
    }

    #[test]
    fn decode_rejects_malformed_text() {
        assert!(decode_as::<Company>(&JsonCodec::new(), "not json").is_err());
        assert!(decode_as::<Company>(&JsonCodec::new(), r#"{"name":"ABC"}"#).is_err());
    }
}
