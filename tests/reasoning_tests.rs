//! Chat-completion reasoner against a mock server

use std::sync::Arc;
use std::time::Duration;

use ppq_voice::application::ports::{ApiError, Reasoner, ReasoningError, SecretStore};
use ppq_voice::application::ApiKeyResolver;
use ppq_voice::domain::reasoning::{ReasoningConfig, DEFAULT_REASONING_MODEL, SYSTEM_INSTRUCTION};
use ppq_voice::domain::retry::RetryPolicy;
use ppq_voice::infrastructure::{ChatCompletionReasoner, MemorySecretStore};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reasoner(server: &MockServer) -> ChatCompletionReasoner {
    let sources: Vec<Arc<dyn SecretStore>> =
        vec![Arc::new(MemorySecretStore::with_api_key("sk-test-key"))];
    ChatCompletionReasoner::new(Arc::new(ApiKeyResolver::new(sources)), &server.uri())
        .with_retry_policy(RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        })
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

async fn last_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().expect("at least one request");
    serde_json::from_slice(&last.body).unwrap()
}

#[tokio::test]
async fn sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test-key"))
        .respond_with(chat_reply("  Hello, world.  "))
        .expect(1)
        .mount(&server)
        .await;

    let cleaned = reasoner(&server)
        .clean("hello world", "gpt-test", None, &ReasoningConfig::default())
        .await
        .unwrap();
    assert_eq!(cleaned, "Hello, world.");

    let body = last_request_body(&server).await;
    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], SYSTEM_INSTRUCTION);
    assert_eq!(body["messages"][1]["role"], "user");
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("hello world"));
    assert!(user.ends_with("Improved text:"));
    assert!(body["max_tokens"].as_u64().unwrap() >= 100);
}

#[tokio::test]
async fn persona_mention_switches_to_agent_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("Please send the report."))
        .mount(&server)
        .await;

    reasoner(&server)
        .clean(
            "jarvis please send the report",
            "gpt-test",
            Some("Jarvis"),
            &ReasoningConfig::default(),
        )
        .await
        .unwrap();

    let body = last_request_body(&server).await;
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.starts_with("You are Jarvis"));
}

#[tokio::test]
async fn explicit_config_overrides_budget_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("ok"))
        .mount(&server)
        .await;

    let config = ReasoningConfig {
        temperature: Some(0.0),
        max_tokens: Some(64),
    };
    reasoner(&server)
        .clean("some text", "", None, &config)
        .await
        .unwrap();

    let body = last_request_body(&server).await;
    assert_eq!(body["model"], DEFAULT_REASONING_MODEL);
    assert_eq!(body["max_tokens"], 64);
    assert_eq!(body["temperature"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn accepts_responses_api_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "From the output array." }]
            }]
        })))
        .mount(&server)
        .await;

    let cleaned = reasoner(&server)
        .clean("from the output array", "gpt-test", None, &ReasoningConfig::default())
        .await
        .unwrap();
    assert_eq!(cleaned, "From the output array.");
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("Recovered."))
        .expect(1)
        .mount(&server)
        .await;

    let cleaned = reasoner(&server)
        .clean("recovered", "gpt-test", None, &ReasoningConfig::default())
        .await
        .unwrap();
    assert_eq!(cleaned, "Recovered.");
}

#[tokio::test]
async fn bad_request_fails_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
        .expect(1)
        .mount(&server)
        .await;

    let err = reasoner(&server)
        .clean("text", "nope", None, &ReasoningConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReasoningError::Api(ApiError::Http { status: 400, .. })
    ));
}

#[tokio::test]
async fn empty_completion_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("   "))
        .expect(1)
        .mount(&server)
        .await;

    let err = reasoner(&server)
        .clean("text", "gpt-test", None, &ReasoningConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReasoningError::EmptyResult));
}

#[tokio::test]
async fn blank_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let reasoner = reasoner(&server);
    let err = reasoner
        .clean(" \n ", "gpt-test", None, &ReasoningConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReasoningError::EmptyInput));
    assert!(!reasoner.is_processing());
}

#[tokio::test]
async fn concurrent_clean_is_rejected_while_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(chat_reply("First.").set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let reasoner = reasoner(&server);
    let config = ReasoningConfig::default();
    let (first, second) = tokio::join!(
        reasoner.clean("first", "gpt-test", None, &config),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(reasoner.is_processing());
            reasoner.clean("second", "gpt-test", None, &config).await
        }
    );

    assert_eq!(first.unwrap(), "First.");
    assert!(matches!(second, Err(ReasoningError::AlreadyInFlight)));
    assert!(!reasoner.is_processing());
}
