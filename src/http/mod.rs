//! HTTP message codec and per-connection handling.
//!
//! The codec is deliberately whitespace-token based rather than a strict
//! RFC 7230 state machine:
//!
//! - **`headers`**: ordered header container with first-match lookup
//! - **`request`** / **`response`**: the two message shapes
//! - **`parser`**: token reader plus request/response parsing
//! - **`writer`**: bounded serialization back to wire bytes
//! - **`mime`**: suffix → MIME type prefix tree
//! - **`connection`**: one worker's parse → resolve → respond cycle
//!
//! # Wire layout
//!
//! ```text
//! <METHOD> <uri> <version>\r\n         <version> <code> <reason>\r\n
//! <key>: <value>\r\n                   <key>: <value>\r\n
//! \r\n                                 \r\n
//! <body>\r\n                           <body>\r\n
//! ```
//!
//! A header value is a single whitespace-delimited token. The body is every
//! byte after the header block, minus leading whitespace.

pub mod connection;
pub mod error;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub const METHOD_LENGTH: usize = 8;
pub const HEADER_KEY_LENGTH: usize = 64;
pub const HEADER_VALUE_LENGTH: usize = 4096;
pub const URI_LENGTH: usize = 256;
pub const HTTP_VERSION_LENGTH: usize = 64;
pub const REASON_PHRASE_LENGTH: usize = 64;
pub const BODY_LENGTH: usize = 16384;

/// Cuts `s` to at most `limit` bytes without splitting a UTF-8 sequence.
pub(crate) fn truncate_str(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }

    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
