use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use chttpd::http::connection::Connection;
use chttpd::http::mime::MimeIndex;
use chttpd::http::parser::parse_response_bytes;
use chttpd::server::files::{read_resource, ResolveError};
use chttpd::server::listener::serve;
use chttpd::server::ServerContext;

fn site() -> (tempfile::TempDir, Arc<ServerContext>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
    std::fs::write(dir.path().join("blob.bin"), [0u8, 1, 2]).unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/index.html"), "<p>docs</p>").unwrap();

    let mut mime = MimeIndex::new();
    mime.load("html text/html\ncss text/css\n".as_bytes()).unwrap();

    let ctx = Arc::new(ServerContext::new(mime, dir.path()));
    (dir, ctx)
}

async fn start(ctx: Arc<ServerContext>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, ctx));
    addr
}

async fn roundtrip(addr: std::net::SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_serves_file_with_mime_type() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let out = roundtrip(addr, b"GET /style.css HTTP/1.1\r\nHost: test\r\n\r\n").await;
    let (resp, _) = parse_response_bytes(&out).unwrap();

    assert_eq!(resp.code, 200);
    assert_eq!(resp.header("Content-Type"), Some("text/css"));
    assert_eq!(resp.header("Content-Length"), Some("6"));
    assert_eq!(resp.body, b"body{}\r\n");
}

#[tokio::test]
async fn test_unknown_suffix_falls_back_to_octet_stream() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let out = roundtrip(addr, b"GET /blob.bin HTTP/1.1\r\n\r\n").await;
    let (resp, _) = parse_response_bytes(&out).unwrap();

    assert_eq!(resp.code, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/octet-stream"));
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let out = roundtrip(addr, b"GET /nope.html HTTP/1.1\r\n\r\n").await;
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(text.contains("404 Not Found: /nope.html"));
}

#[tokio::test]
async fn test_directory_serves_index() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let out = roundtrip(addr, b"GET /docs/ HTTP/1.1\r\n\r\n").await;
    let (resp, _) = parse_response_bytes(&out).unwrap();

    assert_eq!(resp.code, 200);
    assert_eq!(resp.header("Content-Type"), Some("text/html"));
    assert_eq!(resp.body, b"<p>docs</p>\r\n");
}

#[tokio::test]
async fn test_parent_traversal_is_404() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let out = roundtrip(addr, b"GET /../etc/passwd HTTP/1.1\r\n\r\n").await;
    let (resp, _) = parse_response_bytes(&out).unwrap();

    assert_eq!(resp.code, 404);
}

#[tokio::test]
async fn test_request_without_blank_line_answered_after_half_close() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /index.html HTTP/1.1").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    let (resp, _) = parse_response_bytes(&out).unwrap();

    assert_eq!(resp.code, 200);
    assert_eq!(resp.body, b"<h1>home</h1>\r\n");
}

#[tokio::test]
async fn test_failed_connection_does_not_stop_accept_loop() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    // connect and hang up without sending anything
    drop(TcpStream::connect(addr).await.unwrap());

    let out = roundtrip(addr, b"GET /index.html HTTP/1.1\r\n\r\n").await;
    let (resp, _) = parse_response_bytes(&out).unwrap();
    assert_eq!(resp.code, 200);
}

#[tokio::test]
async fn test_concurrent_connections() {
    let (_dir, ctx) = site();
    let addr = start(ctx).await;

    let mut tasks = Vec::new();
    for i in 0..16 {
        tasks.push(tokio::spawn(async move {
            let uri = if i % 2 == 0 { "/index.html" } else { "/missing" };
            let raw = format!("GET {} HTTP/1.1\r\n\r\n", uri);
            let out = roundtrip(addr, raw.as_bytes()).await;
            let (resp, _) = parse_response_bytes(&out).unwrap();
            (i, resp.code)
        }));
    }

    for task in tasks {
        let (i, code) = task.await.unwrap();
        assert_eq!(code, if i % 2 == 0 { 200 } else { 404 });
    }
}

#[tokio::test]
async fn test_connection_over_in_memory_stream() {
    let (_dir, ctx) = site();
    let (mut client, server) = tokio::io::duplex(64 * 1024);

    let worker = tokio::spawn(Connection::new(server, "duplex", ctx).run());

    client
        .write_all(b"POST /index.html HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc")
        .await
        .unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    worker.await.unwrap().unwrap();

    let (resp, _) = parse_response_bytes(&out).unwrap();
    assert_eq!(resp.code, 200);
}

#[tokio::test]
async fn test_read_resource_errors() {
    let (dir, _ctx) = site();

    assert!(matches!(
        read_resource(dir.path(), "/absent").await,
        Err(ResolveError::NotFound(uri)) if uri == "/absent"
    ));

    let file = read_resource(dir.path(), "/index.html?v=2").await.unwrap();
    assert_eq!(file.contents, b"<h1>home</h1>");
    assert!(!file.truncated());
}

#[tokio::test]
async fn test_large_file_truncated_to_body_capacity() {
    let (dir, _ctx) = site();
    std::fs::write(dir.path().join("big.txt"), vec![b'a'; 20_000]).unwrap();

    let file = read_resource(dir.path(), "/big.txt").await.unwrap();
    assert_eq!(file.contents.len(), 16384);
    assert_eq!(file.len, 20_000);
    assert!(file.truncated());
}
