//! Whitespace-token parsing of requests and responses.
//!
//! Both message kinds share one forward-only cursor ([`TokenReader`]) and the
//! same header/body framing: after the first line, tokens ending in `:` are
//! header keys, each followed by a single-token value. The first token that
//! does not end in `:` is the start of the body, and the rest of the stream is
//! appended to it verbatim.

use std::io::{self, BufReader, Read};

use tracing::trace;

use crate::http::error::{CodecError, Result};
use crate::http::headers::HeaderSet;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::{
    BODY_LENGTH, HEADER_KEY_LENGTH, HEADER_VALUE_LENGTH, HTTP_VERSION_LENGTH, METHOD_LENGTH,
    REASON_PHRASE_LENGTH, URI_LENGTH,
};

/// How bounded fields that overflow are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail with [`CodecError::FieldTruncated`] instead of silently
    /// truncating an oversized field.
    pub strict: bool,
}

/// ASCII whitespace, vertical tab included.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Byte cursor with a single byte of push-back.
pub struct TokenReader<R> {
    inner: BufReader<R>,
    pushback: Option<u8>,
    consumed: usize,
    eof: bool,
}

impl<R: Read> TokenReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            pushback: None,
            consumed: 0,
            eof: false,
        }
    }

    /// Bytes taken from the stream so far, not counting pushed-back ones.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// True once a read has hit end-of-stream and nothing is pushed back.
    pub fn at_eof(&self) -> bool {
        self.eof && self.pushback.is_none()
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.take() {
            self.consumed += 1;
            return Ok(Some(b));
        }

        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(_) => {
                    self.consumed += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn unread(&mut self, b: u8) {
        debug_assert!(self.pushback.is_none());
        self.pushback = Some(b);
        self.consumed -= 1;
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        let b = self.next_byte()?;
        if let Some(b) = b {
            self.unread(b);
        }
        Ok(b)
    }

    fn skip_space(&mut self) -> io::Result<()> {
        while let Some(b) = self.next_byte()? {
            if !is_space(b) {
                self.unread(b);
                break;
            }
        }
        Ok(())
    }

    /// Reads the next token of at most `max_len` bytes.
    ///
    /// Leading whitespace is skipped. The token ends at whitespace (left in
    /// the stream), at a NUL byte (consumed), at end-of-stream, or once
    /// `max_len` bytes have been copied. In the last case the remainder of
    /// the run stays in the stream and becomes the next token.
    pub fn next_token(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        self.skip_space()?;

        let mut token = Vec::new();
        while token.len() < max_len {
            match self.next_byte()? {
                None | Some(0) => break,
                Some(b) if is_space(b) => {
                    self.unread(b);
                    break;
                }
                Some(b) => token.push(b),
            }
        }
        Ok(token)
    }

    /// Like [`TokenReader::next_token`], additionally reporting whether the
    /// token was cut at `max_len` with more token bytes still waiting.
    fn next_token_checked(&mut self, max_len: usize) -> io::Result<(Vec<u8>, bool)> {
        let token = self.next_token(max_len)?;
        if token.len() < max_len {
            return Ok((token, false));
        }
        let more = matches!(self.peek()?, Some(b) if b != 0 && !is_space(b));
        Ok((token, more))
    }

    /// Consumes what is left of the current token and returns how many
    /// bytes that was.
    fn skip_token_rest(&mut self) -> io::Result<usize> {
        let mut skipped = 0;
        while let Some(b) = self.next_byte()? {
            if b == 0 {
                break;
            }
            if is_space(b) {
                self.unread(b);
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Reads a decimal integer: leading whitespace, an optional sign, then
    /// digits up to the first non-digit (left in the stream). No digits
    /// yields 0 and out-of-range values saturate.
    pub fn next_int(&mut self) -> io::Result<i32> {
        self.skip_space()?;

        let mut negative = false;
        if let Some(b) = self.next_byte()? {
            match b {
                b'-' => negative = true,
                b'+' => {}
                other => self.unread(other),
            }
        }

        let mut value: i64 = 0;
        while let Some(b) = self.next_byte()? {
            if !b.is_ascii_digit() {
                self.unread(b);
                break;
            }
            value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
        }

        let value = if negative { -value } else { value };
        Ok(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Appends the rest of the stream to `buf` until it holds `limit` bytes.
    /// Returns true if bytes were left unread because of the limit.
    fn read_rest(&mut self, buf: &mut Vec<u8>, limit: usize) -> io::Result<bool> {
        while buf.len() < limit {
            match self.next_byte()? {
                Some(b) => buf.push(b),
                None => return Ok(false),
            }
        }
        Ok(self.peek()?.is_some())
    }
}

struct FieldReader<'a, R> {
    reader: &'a mut TokenReader<R>,
    strict: bool,
}

impl<R: Read> FieldReader<'_, R> {
    fn token(&mut self, field: &'static str, limit: usize) -> Result<Vec<u8>> {
        if !self.strict {
            return Ok(self.reader.next_token(limit)?);
        }
        let (token, truncated) = self.reader.next_token_checked(limit)?;
        if truncated {
            return Err(CodecError::FieldTruncated { field, limit });
        }
        Ok(token)
    }

    /// Bounds apply to wire bytes; decoding happens after and never cuts.
    fn string(&mut self, field: &'static str, limit: usize) -> Result<String> {
        let token = self.token(field, limit)?;
        Ok(String::from_utf8_lossy(&token).into_owned())
    }

    /// Reads the method token. A token longer than any method name is
    /// consumed whole and maps to `OTHER`, so it never spills into the URI.
    fn method(&mut self) -> Result<Method> {
        let token = self.reader.next_token(METHOD_LENGTH)?;
        if token.len() == METHOD_LENGTH && self.reader.skip_token_rest()? > 0 {
            return Ok(Method::OTHER);
        }
        Ok(Method::from_token(&String::from_utf8_lossy(&token)))
    }

    /// Runs the header loop and returns the body.
    fn headers_and_body(&mut self, headers: &mut HeaderSet) -> Result<Vec<u8>> {
        let mut fragment = Vec::new();
        while !self.reader.at_eof() {
            // an over-long key token simply becomes the body, which loses nothing
            let token = self.reader.next_token(HEADER_KEY_LENGTH)?;
            if token.last() != Some(&b':') {
                fragment = token;
                break;
            }
            let key = String::from_utf8_lossy(&token[..token.len() - 1]).into_owned();
            let value = self.string("header value", HEADER_VALUE_LENGTH)?;
            trace!(key = %key, value = %value, "parsed header");
            headers.add_unbounded(key, value);
        }

        let mut body = fragment;
        let overflow = self.reader.read_rest(&mut body, BODY_LENGTH)?;
        if overflow && self.strict {
            return Err(CodecError::FieldTruncated {
                field: "body",
                limit: BODY_LENGTH,
            });
        }
        Ok(body)
    }
}

/// Parses a request from `reader`, returning it with the number of bytes
/// consumed. Oversized fields are truncated.
pub fn parse_request<R: Read>(reader: R) -> Result<(Request, usize)> {
    parse_request_with(reader, ParseOptions::default())
}

pub fn parse_request_with<R: Read>(reader: R, opts: ParseOptions) -> Result<(Request, usize)> {
    let mut tokens = TokenReader::new(reader);
    let mut fields = FieldReader {
        reader: &mut tokens,
        strict: opts.strict,
    };

    let mut request = Request::new();
    request.method = fields.method()?;
    request.uri = fields.string("uri", URI_LENGTH)?;
    request.http_version = fields.string("http_version", HTTP_VERSION_LENGTH)?;
    request.body = fields.headers_and_body(&mut request.headers)?;

    Ok((request, tokens.consumed()))
}

/// Parses a response from `reader`, returning it with the number of bytes
/// consumed. The status code is read numerically; everything else follows
/// the request rules.
pub fn parse_response<R: Read>(reader: R) -> Result<(Response, usize)> {
    parse_response_with(reader, ParseOptions::default())
}

pub fn parse_response_with<R: Read>(reader: R, opts: ParseOptions) -> Result<(Response, usize)> {
    let mut tokens = TokenReader::new(reader);
    let mut fields = FieldReader {
        reader: &mut tokens,
        strict: opts.strict,
    };

    let mut response = Response::new();
    response.http_version = fields.string("http_version", HTTP_VERSION_LENGTH)?;
    response.code = fields.reader.next_int()?;
    response.reason_phrase = fields.string("reason_phrase", REASON_PHRASE_LENGTH)?;
    response.body = fields.headers_and_body(&mut response.headers)?;

    Ok((response, tokens.consumed()))
}

pub fn parse_request_bytes(buf: &[u8]) -> Result<(Request, usize)> {
    parse_request(buf)
}

pub fn parse_response_bytes(buf: &[u8]) -> Result<(Response, usize)> {
    parse_response(buf)
}
