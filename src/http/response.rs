use std::fmt;

use crate::http::headers::HeaderSet;
use crate::http::{truncate_str, BODY_LENGTH, HTTP_VERSION_LENGTH, REASON_PHRASE_LENGTH};

/// Status codes the daemon produces itself.
///
/// Parsed responses keep whatever numeric code arrived on the wire in
/// [`Response::code`]; this enum only names the ones we emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use chttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_i32(), 200);
    /// assert_eq!(StatusCode::NotFound.as_i32(), 404);
    /// ```
    pub fn as_i32(&self) -> i32 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard reason phrase.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// An HTTP response, parsed from the wire or built for sending.
///
/// `reason_phrase` is bounded to 64 bytes and `body` to 16384. A parsed
/// reason phrase is a single token, so "Not Found" comes back as "Not".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub http_version: String,
    pub code: i32,
    pub reason_phrase: String,
    pub headers: HeaderSet,
    pub body: Vec<u8>,
}

impl Response {
    /// An empty response, ready to be filled by the parser.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// 200 with the given body and content type.
    pub fn ok(body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    /// 404 whose body names the URI that could not be resolved.
    pub fn not_found(uri: &str) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/plain")
            .body(format!("404 Not Found: {}\n", uri))
            .build()
    }

    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .header("Content-Type", "text/plain")
            .body(b"500 Internal Server Error\n".to_vec())
            .build()
    }
}

/// Human-readable rendering: `\n` line ends and no blank separator line.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.http_version, self.code, self.reason_phrase)?;
        for h in &self.headers {
            writeln!(f, "{}: {}", h.key, h.value)?;
        }
        writeln!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use chttpd::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    http_version: String,
    code: i32,
    reason_phrase: String,
    headers: HeaderSet,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self::with_code(status.as_i32(), status.reason_phrase())
    }

    /// Starts from an arbitrary numeric code and reason phrase.
    pub fn with_code(code: i32, reason_phrase: &str) -> Self {
        Self {
            http_version: "HTTP/1.1".to_string(),
            code,
            reason_phrase: truncate_str(reason_phrase, REASON_PHRASE_LENGTH).to_string(),
            headers: HeaderSet::new(),
            body: Vec::new(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.http_version = truncate_str(version, HTTP_VERSION_LENGTH).to_string();
        self
    }

    /// Appends a header. Repeating a key keeps both; lookups see the first.
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Sets the body, truncated to the body capacity.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let mut body = body.into();
        body.truncate(BODY_LENGTH);
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body size unless one was set already.
    pub fn build(mut self) -> Response {
        if !self.headers.contains("Content-Length") {
            self.headers.add("Content-Length", self.body.len().to_string());
        }

        Response {
            http_version: self.http_version,
            code: self.code,
            reason_phrase: self.reason_phrase,
            headers: self.headers,
            body: self.body,
        }
    }
}
