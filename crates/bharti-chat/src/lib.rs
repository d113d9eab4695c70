//! Conversation pipeline for the Bharti backend.
//!
//! Per incoming message the orchestrator runs a linear pipeline with one
//! branch point: classify the intent, conditionally resolve retrieval
//! context, generate the answer (with a JSON validate/repair loop for
//! structured output), and append both turns to the session.
//!
//! Every component failure below the orchestrator degrades to a valid
//! answer; only the total no-output case surfaces as an error.

pub mod context;
pub mod generate;
pub mod intent;
pub mod orchestrator;
pub mod repair;
pub mod translate;

pub use context::ContextResolver;
pub use generate::ResponseGenerator;
pub use intent::{IntentClassifier, LlmIntentClassifier};
pub use orchestrator::ConversationOrchestrator;
pub use repair::ResponseRepairer;
pub use translate::{LlmTranslator, Translator};
