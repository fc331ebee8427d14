//! HTTP API tests driving the router in-process.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::*;
use grounded_rag::server::{state::AppState, RagServer};

const BOUNDARY: &str = "grounded-rag-test-boundary";

fn make_server() -> RagServer {
    let config = config(50, 10);
    let service = geography_service(50, 10);
    RagServer::with_state(AppState::new(config, service))
}

fn server_with_upload_limit(limit: usize) -> RagServer {
    let mut config = config(50, 10);
    config.server.max_upload_size = limit;
    let service = geography_service(50, 10);
    RagServer::with_state(AppState::new(config, service))
}

fn multipart_upload(field: &str, filename: &str, content_type: &str, body: &str) -> Request<Body> {
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n{body}\r\n--{b}--\r\n",
        b = BOUNDARY,
    );
    Request::post("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(payload))
        .unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "OK");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_upload_then_query() {
    let server = make_server();

    let resp = server
        .router()
        .oneshot(multipart_upload("file", "geo.txt", "text/plain", PARIS))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["document"]["name"], "geo.txt");
    assert_eq!(json["document"]["chunksCount"], 2);

    let resp = server
        .router()
        .oneshot(post_json(
            "/api/query",
            r#"{"question":"What is Paris known for?","k":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["sources"].as_array().unwrap().len(), 1);
    assert_eq!(json["sources"][0]["id"], "geo.txt-chunk-1");
    assert!(json["answer"].as_str().unwrap().contains("Eiffel Tower"));

    let resp = server
        .router()
        .oneshot(Request::get("/api/documents").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["indexedChunks"], 2);
}

#[tokio::test]
async fn test_upload_media_type_guessed_from_filename() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(multipart_upload(
            "file",
            "notes.txt",
            "application/octet-stream",
            PARIS,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_unsupported_format() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(multipart_upload("file", "logo.png", "image/png", "not really a png"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "UNSUPPORTED_FORMAT");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(multipart_upload("attachment", "geo.txt", "text/plain", PARIS))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_upload_empty_document() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(multipart_upload("file", "blank.txt", "text/plain", "   "))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "EMPTY_DOCUMENT");
    assert!(server.state().list_documents().is_empty());
}

#[tokio::test]
async fn test_empty_question() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(post_json("/api/query", r#"{"question":"  "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "EMPTY_QUESTION");
}

#[tokio::test]
async fn test_unknown_document() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(
            Request::get("/api/documents/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_query_body() {
    let server = make_server();
    let resp = server
        .router()
        .oneshot(post_json("/api/query", r#"{"q":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["code"], "INVALID_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn test_upload_over_size_limit() {
    let server = server_with_upload_limit(1024);
    let resp = server
        .router()
        .oneshot(multipart_upload(
            "file",
            "big.txt",
            "text/plain",
            &"Paris ".repeat(1400),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["code"], "FILE_TOO_LARGE");
    assert_eq!(json["error"], "File too large. Maximum size is 1KB");
    assert!(server.state().list_documents().is_empty());
    assert!(server.state().service().index().is_empty());
}
