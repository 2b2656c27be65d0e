//! Behaviour tests for `AnswerService` against a scripted transport.
//!
//! The transport counts calls and records what it was asked to send, so these
//! tests can check both the outcome mapping and that no request is made when
//! the service short-circuits.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use webqa::answer::{NO_ANSWER_PLACEHOLDER, SYSTEM_INSTRUCTION};
use webqa::gemini::{GenerateContentRequest, ProviderReply};
use webqa::{
    AnswerService, GeminiClientBuilder, GeminiConfig, GeminiError, GeminiTransport,
    QueryPreprocessor,
};

enum Behavior {
    Reply(ProviderReply),
    ConnectionFailure,
}

struct Recorded {
    model: String,
    api_key: String,
    payload: serde_json::Value,
}

struct ScriptedTransport {
    behavior: Behavior,
    calls: AtomicUsize,
    last: Mutex<Option<Recorded>>,
}

impl ScriptedTransport {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    fn replying(status: u16, body: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(ProviderReply::new(status, body)))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeminiTransport for ScriptedTransport {
    fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<ProviderReply, GeminiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(Recorded {
            model: model.to_string(),
            api_key: api_key.to_string(),
            payload: serde_json::to_value(request).unwrap(),
        });

        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::ConnectionFailure => Err(GeminiError::Network(
                reqwest::blocking::Client::new()
                    .get("not-a-valid-url")
                    .build()
                    .unwrap_err(),
            )),
        }
    }
}

fn configured() -> GeminiConfig {
    GeminiConfig::default()
        .with_api_key("test-key")
        .with_model("gemini-test")
}

const PARIS_BODY: &str = r#"{
  "candidates": [
    {
      "content": {"parts": [{"text": "Paris"}], "role": "model"},
      "finishReason": "STOP"
    }
  ]
}"#;

#[test]
fn missing_api_key_short_circuits_without_network_call() {
    let transport = ScriptedTransport::replying(200, PARIS_BODY);
    let service = AnswerService::new(GeminiConfig::default(), transport.clone());

    for question in ["", "what is rust", "x y z"] {
        let result = service.answer(&QueryPreprocessor::process(question));
        assert!(result.is_error());
        assert_eq!(result.raw_response(), "N/A");
        assert!(result.answer().contains("GEMINI_API_KEY"));
    }

    assert_eq!(transport.calls(), 0);
}

#[test]
fn successful_reply_returns_first_candidate_text() {
    let transport = ScriptedTransport::replying(200, PARIS_BODY);
    let service = AnswerService::new(configured(), transport.clone());

    let result = service.answer(&QueryPreprocessor::process("What's the Capital of France?"));

    assert!(!result.is_error());
    assert_eq!(result.answer(), "Paris");
    assert_eq!(result.raw_response(), PARIS_BODY);
    assert_eq!(transport.calls(), 1);
}

#[test]
fn request_uses_configured_model_key_and_processed_text() {
    let transport = ScriptedTransport::replying(200, PARIS_BODY);
    let service = AnswerService::new(configured(), transport.clone());

    service.answer(&QueryPreprocessor::process("  What's the Capital of France?  "));

    let recorded = transport.last.lock().unwrap();
    let recorded = recorded.as_ref().expect("request should have been sent");
    assert_eq!(recorded.model, "gemini-test");
    assert_eq!(recorded.api_key, "test-key");
    assert_eq!(
        recorded.payload,
        serde_json::json!({
            "contents": [{"parts": [{"text": "whats the capital of france"}]}],
            "systemInstruction": {"parts": [{"text": SYSTEM_INSTRUCTION}]},
            "tools": [{"google_search": {}}]
        })
    );
}

#[test]
fn rate_limited_reply_is_error_with_body_verbatim() {
    let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
    let transport = ScriptedTransport::replying(429, body);
    let service = AnswerService::new(configured(), transport.clone());

    let result = service.answer(&QueryPreprocessor::process("anything"));

    assert!(result.is_error());
    assert_eq!(result.raw_response(), body);
    assert!(result.answer().starts_with("API Error: Status 429."));
    assert!(result.answer().contains("RESOURCE_EXHAUSTED"));
    assert_eq!(transport.calls(), 1);
}

#[test]
fn malformed_success_body_yields_placeholder() {
    for body in [
        r#"{}"#,
        r#"{"candidates": []}"#,
        r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
        r#"{"candidates": [{"content": {"parts": []}}]}"#,
        r#"{"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]}"#,
    ] {
        let service = AnswerService::new(configured(), ScriptedTransport::replying(200, body));
        let result = service.answer(&QueryPreprocessor::process("q"));

        assert!(!result.is_error(), "body: {body}");
        assert_eq!(result.answer(), NO_ANSWER_PLACEHOLDER);
        assert_eq!(result.answer(), "No answer generated.");
        assert_eq!(result.raw_response(), body);
    }
}

#[test]
fn unparsable_success_body_is_unexpected_error() {
    let service = AnswerService::new(
        configured(),
        ScriptedTransport::replying(200, "<html>Bad Gateway</html>"),
    );
    let result = service.answer(&QueryPreprocessor::process("q"));

    assert!(result.is_error());
    assert!(result.answer().starts_with("An unexpected server error occurred:"));
    assert!(!result.raw_response().is_empty());

    for body in ["[]", "[[]]"] {
        let service = AnswerService::new(configured(), ScriptedTransport::replying(200, body));
        let result = service.answer(&QueryPreprocessor::process("q"));

        assert!(result.is_error(), "body {body} should not count as an answer");
        assert!(result.answer().starts_with("An unexpected server error occurred:"));
    }
}

#[test]
fn connection_failure_is_reported_as_connection_error() {
    let transport = ScriptedTransport::new(Behavior::ConnectionFailure);
    let service = AnswerService::new(configured(), transport.clone());

    let result = service.answer(&QueryPreprocessor::process("q"));

    assert!(result.is_error());
    assert!(result.answer().contains("Connection Error"));
    assert!(result.answer().contains("Could not reach the API endpoint"));
    assert!(result.raw_response().starts_with("Network error"));
    assert_eq!(transport.calls(), 1);
}

#[test]
fn unreachable_endpoint_with_real_client_is_connection_error() {
    let config = configured()
        .with_base_url("http://127.0.0.1:1/v1beta")
        .with_timeout(Duration::from_secs(5));
    let service = AnswerService::from_config(config).unwrap();

    let result = service.answer(&QueryPreprocessor::process("q"));

    assert!(result.is_error());
    assert!(result.answer().starts_with("Connection Error"));
}

#[test]
fn each_call_makes_exactly_one_attempt() {
    let transport = ScriptedTransport::replying(503, "unavailable");
    let service = AnswerService::new(configured(), transport.clone());

    service.answer(&QueryPreprocessor::process("one"));
    service.answer(&QueryPreprocessor::process("two"));

    assert_eq!(transport.calls(), 2);
}

#[test]
fn invalid_base_url_fails_at_construction() {
    let config = configured().with_base_url("not a url");
    assert!(matches!(
        AnswerService::from_config(config),
        Err(GeminiError::InvalidUrl(_))
    ));

    // Sanity check that the same URL is rejected by the client builder directly.
    assert!(GeminiClientBuilder::new().base_url("not a url").build().is_err());
}
