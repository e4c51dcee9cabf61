//! REST request type.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Request parameters keyed by name.
pub type Params = Map<String, Value>;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Parses a method, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Parses a comma separated method list such as `"GET, POST"`.
    ///
    /// Unknown entries are skipped.
    #[must_use]
    pub fn parse_list(s: &str) -> Vec<Self> {
        s.split(',').filter_map(Self::parse).collect()
    }

    /// Returns the method as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins methods the way route records expect them: `"GET, POST"`.
#[must_use]
pub fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A REST request as seen by permission checks and handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path, including the namespace.
    pub path: String,
    /// Parameters captured from the route pattern.
    pub url_params: Params,
    /// Query string parameters.
    pub query: Params,
    /// Body parameters.
    pub body: Params,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            url_params: Params::new(),
            query: Params::new(),
            body: Params::new(),
            headers: HashMap::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets a body parameter.
    #[must_use]
    pub fn body_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Replaces the parameters captured from the route pattern.
    #[must_use]
    pub fn with_url_params(mut self, params: Params) -> Self {
        self.url_params = params;
        self
    }

    /// Gets a header value.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every parameter merged into one map.
    ///
    /// Body parameters override query parameters and pattern captures
    /// override both.
    #[must_use]
    pub fn params(&self) -> Params {
        let mut params = self.query.clone();
        params.extend(self.body.clone());
        params.extend(self.url_params.clone());
        params
    }

    /// Gets a single parameter, with the same precedence as [`Request::params`].
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.url_params
            .get(key)
            .or_else(|| self.body.get(key))
            .or_else(|| self.query.get(key))
    }
}
