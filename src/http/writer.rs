//! Serialization of requests and responses back into wire bytes.
//!
//! Line layout mirrors what [`crate::http::parser`] reads: the first line,
//! one `key: value\r\n` per header in insertion order, a blank `\r\n`, then
//! the body followed by `\r\n`. Parsing that output gives back the same
//! method, uri, version and headers; the body comes back with the trailing
//! `\r\n` attached and without any leading whitespace.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::{CodecError, Result};
use crate::http::headers::HeaderSet;
use crate::http::request::Request;
use crate::http::response::Response;

trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<()>;
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Fixed destination; every write is checked against the remaining room.
struct SliceSink<'a> {
    dst: &'a mut [u8],
    len: usize,
}

impl Sink for SliceSink<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.len + bytes.len();
        if end > self.dst.len() {
            return Err(CodecError::BufferOverflow {
                needed: end,
                capacity: self.dst.len(),
            });
        }
        self.dst[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

impl SliceSink<'_> {
    /// NUL-terminates the output and returns its length including the NUL.
    fn finish(self) -> Result<usize> {
        if self.len == self.dst.len() {
            return Err(CodecError::BufferOverflow {
                needed: self.len + 1,
                capacity: self.dst.len(),
            });
        }
        self.dst[self.len] = 0;
        Ok(self.len + 1)
    }
}

fn emit_tail<S: Sink>(sink: &mut S, headers: &HeaderSet, body: &[u8]) -> Result<()> {
    for h in headers {
        sink.put(h.key.as_bytes())?;
        sink.put(b": ")?;
        sink.put(h.value.as_bytes())?;
        sink.put(b"\r\n")?;
    }
    sink.put(b"\r\n")?;
    sink.put(body)?;
    sink.put(b"\r\n")
}

fn emit_request<S: Sink>(sink: &mut S, req: &Request) -> Result<()> {
    let line = format!("{} {} {}\r\n", req.method, req.uri, req.http_version);
    sink.put(line.as_bytes())?;
    emit_tail(sink, &req.headers, &req.body)
}

fn emit_response<S: Sink>(sink: &mut S, resp: &Response) -> Result<()> {
    let line = format!("{} {} {}\r\n", resp.http_version, resp.code, resp.reason_phrase);
    sink.put(line.as_bytes())?;
    emit_tail(sink, &resp.headers, &resp.body)
}

/// Serializes `req` into `dst`.
///
/// On success the output is NUL-terminated and the returned count includes
/// the terminator. On [`CodecError::BufferOverflow`] the contents of `dst`
/// are unspecified and should be discarded.
pub fn write_request(req: &Request, dst: &mut [u8]) -> Result<usize> {
    let mut sink = SliceSink { dst, len: 0 };
    emit_request(&mut sink, req)?;
    sink.finish()
}

/// Serializes `resp` into `dst`. Same contract as [`write_request`].
pub fn write_response(resp: &Response, dst: &mut [u8]) -> Result<usize> {
    let mut sink = SliceSink { dst, len: 0 };
    emit_response(&mut sink, resp)?;
    sink.finish()
}

/// Unbounded serialization, without a terminator.
pub fn request_to_bytes(req: &Request) -> Vec<u8> {
    let mut buf = Vec::new();
    // writes to a Vec cannot fail
    let _ = emit_request(&mut buf, req);
    buf
}

/// Unbounded serialization, without a terminator.
pub fn response_to_bytes(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(resp.body.len() + 256);
    let _ = emit_response(&mut buf, resp);
    buf
}

/// Holds a serialized response and tracks how much of it reached the peer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: response_to_bytes(response),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
