#![cfg(feature = "proxy")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ba_docgen::adapters::proxy::{router, ProxyState};
use ba_docgen::GeminiClient;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(server: &MockServer) -> axum::Router {
    let client = GeminiClient::new(server.base_url(), "gemini-2.0-flash", "secret-key");
    router(ProxyState::new(client))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_prompt_is_rejected() {
    let server = MockServer::start();
    let upstream = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({}));
    });

    for body in [r#"{}"#, r#"{"prompt": "   "}"#] {
        let response = app(&server)
            .oneshot(post_json("/api/generate", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Prompt is required" }));
    }

    let response = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    upstream.assert_hits(0);
}

#[tokio::test]
async fn test_upstream_body_is_passed_through() {
    let server = MockServer::start();
    let upstream_body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Attendees:\n* Alice" }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "totalTokenCount": 42 }
    });
    let upstream = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .query_param("key", "secret-key")
            .json_body(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Write minutes" }] }]
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(upstream_body.clone());
    });

    for uri in ["/api/generate", "/api/generate-brd"] {
        let response = app(&server)
            .oneshot(post_json(uri, r#"{"prompt": "Write minutes"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "route {}", uri);
        assert_eq!(json_body(response).await, upstream_body);
    }

    upstream.assert_hits(2);
}

#[tokio::test]
async fn test_upstream_failure_returns_generic_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(403)
            .json_body(json!({ "error": { "message": "API key not valid" } }));
    });

    let response = app(&server)
        .oneshot(post_json("/api/generate", r#"{"prompt": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert!(!body.to_string().contains("secret-key"));
}

#[tokio::test]
async fn test_health_and_cors() {
    let server = MockServer::start();

    let response = app(&server)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
    assert_eq!(json_body(response).await["ok"], json!(true));
}
