// print-relay/tests/api.rs
// REST routes driven in-process with tower's oneshot

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use print_relay::Config;
use print_relay::api::{AppState, build_app};
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A loopback port with nothing listening on it
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn app(printer_port: u16) -> Router {
    let config = Config {
        printer_ip: "127.0.0.1".to_string(),
        printer_port,
        printer_timeout_secs: 2,
        fetch_timeout_secs: 2,
        ..Config::default()
    };
    build_app(AppState::new(config).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app(9100);
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_root_reports_default_printer() {
    let app = app(9100);
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Thermal Printer API is running");
    assert_eq!(body["default_printer_ip"], "127.0.0.1");
    assert_eq!(body["default_printer_port"], 9100);
}

#[tokio::test]
async fn test_examples_lists_samples() {
    let app = app(9100);
    let (status, body) = send(&app, get("/examples")).await;
    assert_eq!(status, StatusCode::OK);
    for key in [
        "simple_text",
        "complex_receipt",
        "qr_example",
        "barcode_example",
        "image_example",
    ] {
        assert!(body[key]["commands"].is_array(), "missing example {key}");
    }
}

#[tokio::test]
async fn test_print_to_unreachable_printer_fails_job() {
    let app = app(closed_port().await);

    let (status, body) = send(
        &app,
        post_json("/print", r#"{"commands": [{"text": "hello"}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let job_id = body["job_id"].as_str().expect("job id in error body");
    let (status, job) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["job_id"], job_id);
    assert_eq!(job["status"], "failed");
    assert!(job["error"].as_str().unwrap().contains("127.0.0.1"));
}

#[tokio::test]
async fn test_print_with_printer_override() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let device = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.unwrap();
        received
    });

    // Default printer is unreachable; the query names the live one
    let app = app(closed_port().await);
    let uri = format!("/print?printer_ip=127.0.0.1&printer_port={port}");
    let (status, body) = send(
        &app,
        post_json(&uri, r#"{"commands": [{"text": "receipt"}, {"cut": "FULL"}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Print completed");

    let job_id = body["job_id"].as_str().unwrap();
    let (_, job) = send(&app, get(&format!("/jobs/{job_id}"))).await;
    assert_eq!(job["status"], "completed");
    assert!(job.get("error").is_none());

    let received = device.await.unwrap();
    assert!(received.windows(7).any(|w| w == b"receipt"));
}

#[tokio::test]
async fn test_unknown_job() {
    let app = app(9100);
    let (status, body) = send(&app, get("/jobs/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Job not found: does-not-exist");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app(9100);

    let (status, body) = send(&app, post_json("/print", r#"{"commands": "#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, post_json("/print", r#"{"items": []}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_port_query_is_bad_request() {
    let app = app(9100);
    let (status, _) = send(
        &app,
        post_json("/print?printer_port=99999", r#"{"commands": []}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
