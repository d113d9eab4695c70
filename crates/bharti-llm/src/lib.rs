//! LLM invocation for the Bharti backend.
//!
//! One capability, many prompts: the same chat-completion call backs intent
//! classification, answer generation, JSON repair, and translation. The
//! [`LlmBackend`] trait abstracts the provider API so tests can substitute a
//! scripted backend without any network.

pub mod backends;
pub mod client;
pub mod config;

pub use backends::openai::OpenAiBackend;
pub use backends::LlmBackend;
pub use client::LlmClient;
pub use config::{LlmProvider, ModelConfig};
