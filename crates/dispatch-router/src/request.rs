//! Ambient request environment
//!
//! What the host HTTP layer knows about the current request before routing:
//! the raw URI, the method and the query parameters. The router falls back to
//! `/` and `GET` when the host supplies nothing.

use std::collections::HashMap;

use crate::path::split_query;

/// Default request path
pub const DEFAULT_URL: &str = "/";

/// Default request method
pub const DEFAULT_METHOD: &str = "GET";

/// Query parameters from URL (`?key=value`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Parses a raw query string, percent-decoding keys and values
    ///
    /// ```
    /// use dispatch_router::QueryParams;
    ///
    /// let query = QueryParams::parse("q=rust%20router&ajax&page=2");
    /// assert_eq!(query.get("q"), Some(&"rust router".to_string()));
    /// assert!(query.has("ajax"));
    /// ```
    pub fn parse(query: &str) -> Self {
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a query parameter as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key)?.parse().ok()
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// `+` is a space in form-encoded query strings
fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Request context supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnv {
    /// Request URI as received, possibly with a query string
    pub uri: Option<String>,
    /// HTTP method
    pub method: Option<String>,
    /// Query parameters
    pub query: QueryParams,
}

impl RequestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an environment from a request URI, parsing its query string
    ///
    /// ```
    /// use dispatch_router::RequestEnv;
    ///
    /// let env = RequestEnv::from_uri("/users?ajax=1").with_method("post");
    /// assert!(env.query.has("ajax"));
    /// assert_eq!(env.method(), "POST");
    /// ```
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let query = split_query(&uri)
            .1
            .map(QueryParams::parse)
            .unwrap_or_default();

        Self {
            uri: Some(uri),
            method: None,
            query,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// URI or `/`
    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_URL)
    }

    /// Upper-cased method or `GET`
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_METHOD)
            .to_ascii_uppercase()
    }
}
