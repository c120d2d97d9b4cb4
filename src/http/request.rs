use std::fmt;

use crate::http::headers::HeaderSet;
use crate::http::{truncate_str, BODY_LENGTH, HTTP_VERSION_LENGTH, URI_LENGTH};

/// HTTP request methods.
///
/// Anything that is not one of the eight standard names (matched
/// case-sensitively) becomes `OTHER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    OPTIONS,
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    TRACE,
    CONNECT,
    #[default]
    OTHER,
}

const METHOD_NAMES: [(&str, Method); 8] = [
    ("OPTIONS", Method::OPTIONS),
    ("GET", Method::GET),
    ("HEAD", Method::HEAD),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("TRACE", Method::TRACE),
    ("CONNECT", Method::CONNECT),
];

impl Method {
    /// Maps a request-line token to a method.
    ///
    /// ```
    /// # use chttpd::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::OTHER);
    /// ```
    pub fn from_token(token: &str) -> Self {
        METHOD_NAMES
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, m)| *m)
            .unwrap_or(Method::OTHER)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::OPTIONS => "OPTIONS",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
            Method::OTHER => "OTHER",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed (or about to be serialized) HTTP request.
///
/// `uri` is bounded to 256 bytes, `http_version` to 64 and `body` to 16384.
/// The builder truncates to those bounds; fields assigned directly are
/// trusted as-is by the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub http_version: String,
    pub headers: HeaderSet,
    pub body: Vec<u8>,
}

impl Request {
    /// An empty request, ready to be filled by the parser.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}

/// Human-readable rendering: `\n` line ends and no blank separator line.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.method, self.uri, self.http_version)?;
        for h in &self.headers {
            writeln!(f, "{}: {}", h.key, h.value)?;
        }
        writeln!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    uri: String,
    http_version: Option<String>,
    headers: HeaderSet,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: truncate_str(uri.as_ref(), URI_LENGTH).to_string(),
            http_version: None,
            headers: HeaderSet::new(),
            body: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl AsRef<str>) -> Self {
        self.http_version = Some(truncate_str(version.as_ref(), HTTP_VERSION_LENGTH).to_string());
        self
    }

    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers.add(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let mut body = body.into();
        body.truncate(BODY_LENGTH);
        self.body = body;
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            http_version: self.http_version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
        }
    }
}
