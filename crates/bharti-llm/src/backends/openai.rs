use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use bharti_core::{BhartiError, BhartiResult};
use async_trait::async_trait;
use std::time::Duration;

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, OpenRouter, Groq, Ollama, and any other provider that
/// implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    fn build_messages(
        &self,
        system_prompt: Option<&str>,
        prompt: &str,
    ) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        api_messages.push(serde_json::json!({
            "role": "user",
            "content": prompt
        }));

        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires extra headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/bharti-portal/bharti")
                .header("X-Title", "Bharti")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: Option<&str>, prompt: &str) -> BhartiResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let api_messages = self.build_messages(system_prompt, prompt);

        let body = serde_json::json!({
            "model": self.config.model_id,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": api_messages,
        });

        let request = self.add_provider_headers(self.http.post(&url));

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| BhartiError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BhartiError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(BhartiError::Http(format!(
                "chat completions API error {status}: {resp_body}"
            )));
        }

        parse_completion(&resp_body)
    }
}

/// Extract the assistant text from a chat-completions response body.
pub fn parse_completion(body: &serde_json::Value) -> BhartiResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BhartiError::Http("completion response missing content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_completion_extracts_content() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Greeting"}}]
        });
        assert_eq!(parse_completion(&body).unwrap(), "Greeting");
    }

    #[test]
    fn parse_completion_rejects_missing_content() {
        let body = serde_json::json!({"choices": []});
        assert!(parse_completion(&body).is_err());
    }
}
