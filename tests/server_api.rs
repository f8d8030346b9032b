//! HTTP shell tests: the router's JSON contracts over multipart
//! uploads, exercised in-process without binding a socket.

use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mockito::Server;
use serde_json::Value;
use tower::ServiceExt;

use docpress::server::{router, AppState};
use docpress::{InspectClient, InspectConfig, Pipeline};

const BOUNDARY: &str = "docpress-test-boundary";

static INIT: Once = Once::new();

/// One global subscriber per process; its log bridge must carry the
/// tree-rewrite code's records without a second logger install.
fn init() {
    INIT.call_once(docpress::server::init_logging);
}

fn app(base_url: &str) -> axum::Router {
    let config = InspectConfig::new(base_url, "sid", "key").expect("base URL is valid");
    router(AppState {
        pipeline: Arc::new(Pipeline::default()),
        inspect: Arc::new(InspectClient::new(config)),
    })
}

fn file_part(filename: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n--{BOUNDARY}--\r\n"
    )
}

fn multipart_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn normalize_returns_canonical_html() {
    init();
    let request = multipart_request(
        "/api/normalize",
        file_part("doc.html", "<h1>Title</h1><p>note²</p>"),
    );
    let response = app("http://127.0.0.1:9/").oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["html"], "<h2>Title</h2><p>note[2]</p>");
}

#[tokio::test]
async fn upload_without_a_file_part_is_a_json_error() {
    init();
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         hello\r\n--{BOUNDARY}--\r\n"
    );
    let response = app("http://127.0.0.1:9/")
        .oneshot(multipart_request("/api/normalize", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "no file found in upload");
}

#[tokio::test]
async fn convert_reports_a_message_when_no_superscripts_exist() {
    init();
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/words/storage/file/uploads/doc.docx")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/words/doc.docx/paragraphs")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(multipart_request(
            "/api/convert",
            file_part("doc.docx", "binary"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "No superscripts found.");
}

#[tokio::test]
async fn convert_surfaces_service_failures_as_json_errors() {
    init();
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/words/storage/file/uploads/doc.docx")
        .with_status(500)
        .with_body("storage offline")
        .create_async()
        .await;

    let response = app(&server.url())
        .oneshot(multipart_request(
            "/api/convert",
            file_part("doc.docx", "binary"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let message = body["error"].as_str().expect("error is a string");
    assert!(message.contains("500"));
    assert!(message.contains("storage offline"));
}
