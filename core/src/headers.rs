//! Header collection plus the header names, media types and authorization
//! values the client works with.
//!
//! # Design
//! `Headers` keeps names in the case they were first given (that is what goes
//! on the wire) and a lower-cased index next to them, so every lookup is
//! case-insensitive without scanning. A name maps to an ordered list of
//! values because responses may repeat a header.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Which request methods a resource supports.
pub const ALLOW: &str = "Allow";
/// Desired response media type.
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";

/// Ordered, case-insensitive header multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to a single value, dropping whatever it held before. The
    /// new spelling of the name replaces the old one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name.to_ascii_lowercase()) {
            Some(&pos) => self.entries[pos] = (name, vec![value]),
            None => self.push_entry(name, value),
        }
    }

    /// Add a value to `name`, keeping existing values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name.to_ascii_lowercase()) {
            Some(&pos) => self.entries[pos].1.push(value),
            None => self.push_entry(name, value),
        }
    }

    fn push_entry(&mut self, name: String, value: String) {
        self.index
            .insert(name.to_ascii_lowercase(), self.entries.len());
        self.entries.push((name, vec![value]));
    }

    /// First value stored for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values stored for `name` in arrival order; empty if absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&pos| self.entries[pos].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Every `(name, value)` pair in insertion order, one pair per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name.as_str(), value.as_str()))
        })
    }

    /// Distinct header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// `Authorization` value for HTTP basic authentication.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

pub fn basic_auth_header(username: &str, password: &str) -> Headers {
    Headers::from_iter([(AUTHORIZATION, basic_auth(username, password))])
}

/// `Authorization` value for a bearer token such as a JWT.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn bearer_header(token: &str) -> Headers {
    Headers::from_iter([(AUTHORIZATION, bearer(token))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let headers = Headers::from_iter([("content-type", APPLICATION_JSON)]);
        assert_eq!(headers.get("Content-Type"), Some(APPLICATION_JSON));
        assert_eq!(headers.get("CONTENT-TYPE"), Some(APPLICATION_JSON));
        assert!(headers.contains(CONTENT_TYPE));
    }

    #[test]
    fn missing_header_is_none() {
        let headers = Headers::new();
        assert_eq!(headers.get(CONTENT_TYPE), None);
        assert!(headers.get_all(CONTENT_TYPE).is_empty());
        assert!(headers.is_empty());
    }

    #[test]
    fn append_keeps_every_value_and_get_returns_first() {
        let mut headers = Headers::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("SET-COOKIE"), Some("a=1"));
        assert_eq!(headers.get_all("Set-Cookie"), ["a=1", "b=2"]);
    }

    #[test]
    fn insert_replaces_values_and_spelling() {
        let mut headers = Headers::new();
        headers.insert("accept", APPLICATION_JSON);
        headers.insert("X-Other", "1");
        headers.insert("Accept", APPLICATION_XML);
        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(pairs, [("Accept", APPLICATION_XML), ("X-Other", "1")]);
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let headers = Headers::from_iter([("B", "1"), ("A", "2"), ("b", "3")]);
        let names: Vec<&str> = headers.names().collect();
        assert_eq!(names, ["B", "A"]);
        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(pairs, [("B", "1"), ("B", "3"), ("A", "2")]);
    }

    #[test]
    fn basic_auth_encodes_user_and_password() {
        assert_eq!(basic_auth("per", "secret"), "Basic cGVyOnNlY3JldA==");
        assert_eq!(basic_auth("user", "pa ss"), "Basic dXNlcjpwYSBzcw==");
    }

    #[test]
    fn bearer_prefixes_token() {
        assert_eq!(bearer("abc.def"), "Bearer abc.def");
        assert_eq!(bearer_header("t").get(AUTHORIZATION), Some("Bearer t"));
    }
}
