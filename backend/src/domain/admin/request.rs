//! Transport-neutral view of an inbound admin request.

use std::fmt;

/// Request method understood by the route table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    /// Canonical upper-case token.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other(token) => token.as_str(),
        }
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method, path, query, idempotency header and body of a request.
///
/// Inbound adapters build this value; handlers never see framework types.
///
/// # Examples
/// ```
/// use admin_gateway::domain::admin::{AdminRequest, Method};
///
/// let request = AdminRequest::new(Method::Get, "/admin/user/list/")
///     .with_query("page=2&search=ada%20l");
/// assert_eq!(request.path(), "/admin/user/list");
/// assert_eq!(request.query("search"), Some("ada l"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    idempotency_key: Option<String>,
    body: Vec<u8>,
}

impl AdminRequest {
    /// Start a request with an empty query and body. A single trailing slash
    /// is dropped from `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self {
            method,
            path,
            query: Vec::new(),
            idempotency_key: None,
            body: Vec::new(),
        }
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn with_query(mut self, raw: &str) -> Self {
        self.query = url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        self
    }

    /// Attach the raw `Idempotency-Key` header value.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Attach the raw request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of query parameter `name`.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
