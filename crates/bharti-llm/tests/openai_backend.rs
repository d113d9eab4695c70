//! Integration tests for the OpenAI-compatible backend against a mock server.

use bharti_llm::{LlmClient, LlmProvider, ModelConfig, OpenAiBackend};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        provider: LlmProvider::Groq,
        model_id: "llama3-70b-8192".to_string(),
        api_key: "test-key".to_string(),
        api_base_url: Some(base_url.to_string()),
        temperature: 0.3,
        max_tokens: 1024,
        timeout_secs: 5,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn complete_returns_assistant_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Namaste! 🙏")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(mock_config(&server.uri()));
    let reply = client.complete(Some("You are Bharti."), "Hi").await.unwrap();
    assert_eq!(reply, "Namaste! 🙏");
}

#[tokio::test]
async fn complete_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama3-70b-8192",
            "messages": [
                {"role": "system", "content": "classify"},
                {"role": "user", "content": "Tell me about forts"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Specialised")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(mock_config(&server.uri()));
    let client = LlmClient::from_backend(Box::new(backend));
    let reply = client
        .complete(Some("classify"), "Tell me about forts")
        .await
        .unwrap();
    assert_eq!(reply, "Specialised");
}

#[tokio::test]
async fn complete_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"error": {"message": "rate limited"}})),
        )
        .mount(&server)
        .await;

    let client = LlmClient::new(mock_config(&server.uri()));
    let err = client.complete(None, "hi").await.unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn complete_rejects_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = LlmClient::new(mock_config(&server.uri()));
    assert!(client.complete(None, "hi").await.is_err());
}

#[test]
fn model_config_deserializes_with_defaults() {
    let toml_str = r#"
        provider = "groq"
        model_id = "llama3-70b-8192"
        api_key = "test-key"
    "#;
    let config: ModelConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.temperature, 0.3);
    assert_eq!(config.max_tokens, 1024);
    assert_eq!(config.timeout_secs, 30);
    assert!(config.api_base_url.is_none());
}
