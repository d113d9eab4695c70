pub mod openai;

use bharti_core::BhartiResult;
use async_trait::async_trait;

/// Trait for LLM provider backends.
///
/// Each provider implements this trait to handle API communication. Tests
/// substitute a scripted implementation so no pipeline component ever needs
/// a live model.
///
/// To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `LlmBackend` for your struct
/// 3. Add the variant to `LlmProvider` in `config.rs`
/// 4. Wire it up in `LlmClient::new()` in `client.rs`
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Single-shot chat completion: optional system prompt plus one user
    /// prompt, returning the raw text of the model's reply.
    async fn complete(&self, system_prompt: Option<&str>, prompt: &str) -> BhartiResult<String>;
}
