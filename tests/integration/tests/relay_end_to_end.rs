//! End-to-end relay tests: a real axum server on an ephemeral port talking
//! to an httpmock stand-in for the Gemini API.

use std::net::SocketAddr;
use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use fable_ai::{GeminiClient, GeminiConfig};
use fable_core::NO_PREVIOUS_SUMMARY_PLACEHOLDER;
use fable_gateway::{build_relay_router, RelayServerState};

async fn spawn_relay(upstream: &MockServer) -> (SocketAddr, JoinHandle<()>) {
    let client = GeminiClient::new(GeminiConfig {
        api_base: upstream.base_url(),
        api_key: "integration-key".to_string(),
        model: "gemini-test".to_string(),
        request_timeout_ms: 5_000,
    })
    .expect("gemini client");
    let state = Arc::new(RelayServerState::new(Arc::new(client)));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_relay_router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, handle)
}

#[tokio::test]
async fn chat_happy_path_carries_the_api_key_and_returns_the_reply() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-test:generateContent")
            .query_param("key", "integration-key")
            .json_body_includes(
                json!({
                    "contents": [{"role": "user", "parts": [{"text": "I knock on the gate"}]}]
                })
                .to_string(),
            );
        then.status(200).json_body(json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"scene\":\"gatehouse\"}"}]},
                "finishReason": "STOP"
            }]
        }));
    });

    let (addr, handle) = spawn_relay(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "messages": [{"role": "user", "content": "I knock on the gate"}] }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.expect("json");
    assert_eq!(payload["role"], "assistant");
    assert_eq!(payload["content"], "{\"scene\":\"gatehouse\"}");
    mock.assert();
    handle.abort();
}

#[tokio::test]
async fn chat_correction_loop_re_prompts_with_the_correction_instruction() {
    let upstream = MockServer::start();
    let mut prose = upstream.mock(|when, then| {
        when.method(POST).path("/models/gemini-test:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "The gate creaks open."}]}}]
        }));
    });

    let (addr, handle) = spawn_relay(&upstream).await;
    let request = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "messages": [{"role": "user", "content": "I knock on the gate"}] }))
        .send();
    let pending = tokio::spawn(request);

    // First attempt returns prose; while the relay waits out the fixed
    // correction delay, swap in a mock that requires the correction turn.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    prose.delete();
    let corrected = upstream.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-test:generateContent")
            .body_includes("not in the correct JSON format");
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"scene\":\"gatehouse\"}"}]}}]
        }));
    });

    let response = pending.await.expect("join").expect("request");
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.expect("json");
    assert_eq!(payload["content"], "{\"scene\":\"gatehouse\"}");
    corrected.assert();
    handle.abort();
}

#[tokio::test]
async fn transient_exhaustion_surfaces_a_bad_gateway_with_upstream_detail() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST).path("/models/gemini-test:generateContent");
        then.status(503)
            .json_body(json!({"error": {"message": "model overloaded"}}));
    });

    let (addr, handle) = spawn_relay(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&json!({ "messages": [{"role": "user", "content": "hello?"}] }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 502);
    let payload: Value = response.json().await.expect("json");
    assert_eq!(payload["error"]["code"], "upstream_unavailable");
    assert!(payload["error"]["message"]
        .as_str()
        .expect("message")
        .contains("model overloaded"));
    // Initial attempt plus the full transient budget of three retries.
    mock.assert_calls(4);
    handle.abort();
}

#[tokio::test]
async fn summarize_injects_the_placeholder_when_no_summary_exists() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST)
            .path("/models/gemini-test:generateContent")
            .json_body_includes(
                json!({
                    "contents": [{"role": "user", "parts": [{"text": NO_PREVIOUS_SUMMARY_PLACEHOLDER}]}]
                })
                .to_string(),
            );
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "The hero knocked on the gate."}]}}]
        }));
    });

    let (addr, handle) = spawn_relay(&upstream).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/summarize"))
        .json(&json!({ "messages": [{"role": "user", "content": "I knock on the gate"}] }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.expect("json");
    assert_eq!(payload["content"], "The hero knocked on the gate.");
    mock.assert();
    handle.abort();
}
