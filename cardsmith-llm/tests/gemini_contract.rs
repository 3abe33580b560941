#![cfg(feature = "gemini")]
mod common;
use cardsmith_common::{CardsmithError, GenerationError};
use cardsmith_llm::gemini::{GeminiClient, GeminiSettings};
use cardsmith_llm::traits::LlmClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/models/gemini-test:generateContent";

/// Each test names its own key variable so they can run in parallel.
fn client_for(server: &MockServer, api_key_env: &str) -> GeminiClient {
    GeminiClient::new(GeminiSettings {
        endpoint: server.uri(),
        model: MODEL.to_string(),
        api_key_env: api_key_env.to_string(),
        request_timeout: Some(Duration::from_secs(5)),
        temperature: None,
        max_output_tokens: None,
    })
    .expect("client builds")
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20 }
    })
}

#[tokio::test]
async fn returns_reply_text_verbatim() {
    common::init_test_tracing();
    std::env::set_var("CARDSMITH_TEST_KEY_VERBATIM", "secret-1");
    let server = MockServer::start().await;
    let deck = "T-Rex, a large carnivore\n  Stegosaurus, plated herbivore  \n";

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "secret-1"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "make cards" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(deck)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_VERBATIM");
    let response = client.generate("make cards", None, None, None).await.unwrap();

    assert_eq!(response.text, deck);
    assert_eq!(response.tokens_used, Some(20));
    assert_eq!(response.model.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn multi_part_replies_are_concatenated() {
    std::env::set_var("CARDSMITH_TEST_KEY_PARTS", "secret-2");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "a,b\n" }, { "text": "c,d" }] },
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_PARTS");
    let response = client.generate("p", None, None, None).await.unwrap();
    assert_eq!(response.text, "a,b\nc,d");
}

#[tokio::test]
async fn missing_key_is_sent_unauthenticated_and_reported_as_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Method doesn't allow unregistered callers (callers without established identity).",
                "status": "PERMISSION_DENIED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_NEVER_SET");
    let err = client.generate("p", None, None, None).await.unwrap_err();

    assert!(matches!(
        err,
        CardsmithError::Generation(GenerationError::Unauthorized)
    ));
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-goog-api-key").is_none());
}

#[tokio::test]
async fn quota_rejection_maps_to_rate_limited() {
    std::env::set_var("CARDSMITH_TEST_KEY_QUOTA", "secret-3");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_QUOTA");
    let err = client.generate("p", None, None, None).await.unwrap_err();
    assert!(matches!(
        err,
        CardsmithError::Generation(GenerationError::RateLimited)
    ));
}

#[tokio::test]
async fn safety_block_is_an_error() {
    std::env::set_var("CARDSMITH_TEST_KEY_SAFETY", "secret-4");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_SAFETY");
    let err = client.generate("p", None, None, None).await.unwrap_err();
    assert!(matches!(err, CardsmithError::Generation(GenerationError::Blocked)));
}

#[tokio::test]
async fn no_candidates_is_empty_response() {
    std::env::set_var("CARDSMITH_TEST_KEY_EMPTY", "secret-5");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_EMPTY");
    let err = client.generate("p", None, None, None).await.unwrap_err();
    assert!(matches!(
        err,
        CardsmithError::Generation(GenerationError::EmptyResponse)
    ));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // nothing listens on the discard port
    let client = GeminiClient::new(GeminiSettings {
        endpoint: "http://127.0.0.1:9".to_string(),
        model: MODEL.to_string(),
        api_key_env: "CARDSMITH_TEST_KEY_TRANSPORT".to_string(),
        request_timeout: Some(Duration::from_secs(2)),
        ..GeminiSettings::default()
    })
    .unwrap();

    let err = client.generate("p", None, None, None).await.unwrap_err();
    assert!(matches!(
        err,
        CardsmithError::Generation(GenerationError::Transport(_))
    ));
}

#[tokio::test]
async fn health_check_reports_false_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_HEALTH");
    assert!(!client.health_check().await.unwrap());
}

#[tokio::test]
async fn health_check_accepts_a_reply_cut_off_before_any_text() {
    std::env::set_var("CARDSMITH_TEST_KEY_THINKING", "secret-health");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model" },
                "finishReason": "MAX_TOKENS"
            }],
            "usageMetadata": { "promptTokenCount": 6, "totalTokenCount": 70 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "CARDSMITH_TEST_KEY_THINKING");
    assert!(client.health_check().await.unwrap());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["generationConfig"].get("maxOutputTokens").is_none());
}
