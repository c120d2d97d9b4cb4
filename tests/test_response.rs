use chttpd::http::response::{Response, ResponseBuilder, StatusCode};

#[test]
fn test_status_code_numbers_and_reasons() {
    assert_eq!(StatusCode::Ok.as_i32(), 200);
    assert_eq!(StatusCode::NotFound.as_i32(), 404);
    assert_eq!(StatusCode::InternalServerError.as_i32(), 500);

    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.code, 200);
    assert_eq!(response.reason_phrase, "OK");
    assert_eq!(response.http_version, "HTTP/1.1");
    assert_eq!(response.body, b"Hello, World!".to_vec());
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok).body(body.clone()).build();

    assert_eq!(
        response.header("Content-Length").unwrap(),
        body.len().to_string()
    );
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.header("Content-Length"), Some("999"));
    assert_eq!(response.headers.len(), 1);
}

#[test]
fn test_response_builder_keeps_header_order() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-cache")
        .body(b"{}".to_vec())
        .build();

    let keys: Vec<&str> = response.headers.iter().map(|h| h.key.as_str()).collect();
    assert_eq!(keys, vec!["Content-Type", "Cache-Control", "Content-Length"]);
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert!(response.body.is_empty());
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[test]
fn test_response_builder_caps_body_and_reason() {
    let response = ResponseBuilder::with_code(299, &"R".repeat(100))
        .body(vec![b'x'; 20_000])
        .build();

    assert_eq!(response.reason_phrase.len(), 64);
    assert_eq!(response.body.len(), 16384);
    assert_eq!(response.header("Content-Length"), Some("16384"));
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok(b"body {}".to_vec(), "text/css");

    assert_eq!(response.code, 200);
    assert_eq!(response.header("Content-Type"), Some("text/css"));
    assert_eq!(response.body, b"body {}".to_vec());
}

#[test]
fn test_response_not_found_helper() {
    let response = Response::not_found("/missing.html");

    assert_eq!(response.code, 404);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body, b"404 Not Found: /missing.html\n".to_vec());
}

#[test]
fn test_response_internal_error_helper() {
    let response = Response::internal_error();

    assert_eq!(response.code, 500);
    assert_eq!(response.body, b"500 Internal Server Error\n".to_vec());
}

#[test]
fn test_display_is_human_readable() {
    let response = ResponseBuilder::new(StatusCode::NotFound)
        .header("Content-Length", "0")
        .build();

    assert_eq!(
        response.to_string(),
        "HTTP/1.1 404 Not Found\nContent-Length: 0\n\n"
    );
}
