use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::http::parser::parse_request_bytes;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::http::BODY_LENGTH;
use crate::server::files::{read_resource, ResolveError};
use crate::server::ServerContext;

/// Upper bound on buffered request bytes: head plus a full body.
pub const MAX_REQUEST_BYTES: usize = 32 * 1024 + BODY_LENGTH;

const READ_CHUNK: usize = 4096;
const FALLBACK_MIME: &str = "application/octet-stream";

/// One accepted connection: read one request, answer it, close.
pub struct Connection<S> {
    stream: S,
    peer: String,
    ctx: Arc<ServerContext>,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>, ctx: Arc<ServerContext>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            ctx,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to completion. The stream is shut down on
    /// success and dropped (closing it) on every path.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(req) => ConnectionState::Processing(req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.handle_request(&req).await;
                    info!(
                        peer = %self.peer,
                        method = %req.method,
                        uri = %req.uri,
                        status = response.code,
                        bytes = response.body.len(),
                        "request served"
                    );
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.stream.shutdown().await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Buffers one framed request and parses it. `None` means the client
    /// closed without sending anything.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            if request_frame_len(&self.buffer).is_some() || self.buffer.len() >= MAX_REQUEST_BYTES {
                break;
            }

            self.buffer.reserve(READ_CHUNK);
            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                break;
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }

        let end = request_frame_len(&self.buffer)
            .unwrap_or(self.buffer.len())
            .min(MAX_REQUEST_BYTES);
        let frame = self.buffer.split_to(end);
        let (request, consumed) = parse_request_bytes(&frame)?;
        debug!(peer = %self.peer, consumed, "parsed request");
        Ok(Some(request))
    }

    async fn handle_request(&self, req: &Request) -> Response {
        match read_resource(&self.ctx.root, &req.uri).await {
            Ok(file) => {
                if file.truncated() {
                    warn!(
                        path = %file.path.display(),
                        len = file.len,
                        "file exceeds body capacity, truncating"
                    );
                }
                let mime = self
                    .ctx
                    .mime
                    .uri_mime(file.file_name())
                    .unwrap_or(FALLBACK_MIME);
                Response::ok(file.contents, mime)
            }
            Err(ResolveError::NotFound(uri)) => {
                debug!(peer = %self.peer, uri = %uri, "resource not found");
                Response::not_found(&uri)
            }
            Err(e) => {
                error!(peer = %self.peer, error = %e, "failed to read resource");
                Response::internal_error()
            }
        }
    }
}

/// Length of the first complete request in `buf`, if one has fully arrived.
///
/// The head ends at the first blank line (`\r\n\r\n` or `\n\n`); a
/// `Content-Length` header, matched case-insensitively, extends the frame
/// by that many body bytes.
pub fn request_frame_len(buf: &[u8]) -> Option<usize> {
    let head_end = find_head_end(buf)?;
    let head = String::from_utf8_lossy(&buf[..head_end]);

    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let total = head_end.checked_add(content_length)?;
    (buf.len() >= total).then_some(total)
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
