//! Query-string builder.

use crate::error::RestError;

/// Build a query string from alternating keys and values.
///
/// `parameters(&["foo", "123", "bar", "898"])` gives `"?foo=123&bar=898"`.
/// Every key and value is percent-encoded, a space becoming `%20` (not
/// `+`, as HTML form encoding would have it). No arguments give an empty
/// string; an odd number of arguments is rejected.
pub fn parameters(pairs: &[&str]) -> Result<String, RestError> {
    if pairs.len() % 2 != 0 {
        return Err(RestError::InvalidArgument(format!(
            "query parameters must come in key/value pairs, got {} values",
            pairs.len()
        )));
    }
    let query = pairs
        .chunks_exact(2)
        .map(|pair| {
            format!(
                "{}={}",
                urlencoding::encode(pair[0]),
                urlencoding::encode(pair[1])
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    if query.is_empty() {
        return Ok(query);
    }
    Ok(format!("?{query}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pairs_in_order() {
        assert_eq!(
            parameters(&["foo", "123", "bar", "898"]).unwrap(),
            "?foo=123&bar=898"
        );
    }

    #[test]
    fn no_arguments_gives_empty_string() {
        assert_eq!(parameters(&[]).unwrap(), "");
    }

    #[test]
    fn odd_argument_count_is_rejected() {
        let err = parameters(&["foo", "123", "bar"]).unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn space_is_percent_encoded_not_plus() {
        assert_eq!(parameters(&["q", "a b"]).unwrap(), "?q=a%20b");
    }

    #[test]
    fn keys_and_values_are_encoded() {
        assert_eq!(
            parameters(&["q", "a b&c", "näme", "x=y"]).unwrap(),
            "?q=a%20b%26c&n%C3%A4me=x%3Dy"
        );
    }
}
