use bharti_core::Intent;
use bharti_llm::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const CLASSIFY_PROMPT: &str = "You are an intent classification model. \
Classify the user message into exactly one of the following intents. \
When the user wishes to explore a catalog category, the intent is Specialised.\n\
\n\
1. Greeting\n\
2. General\n\
3. Specialised\n\
4. Unknown\n\
\n\
Respond with only the intent name.";

/// Classifies the latest user message into an [`Intent`].
///
/// Pluggable so tests (or a rule-based deployment) can avoid a live model.
/// The classifier runs exactly once per turn and its output is never
/// revised within that turn.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify the latest user message. Must not fail: any upstream error
    /// or unrecognized label degrades to [`Intent::Unknown`].
    async fn classify(&self, latest_user_text: &str) -> Intent;
}

/// Prompt-based classifier backed by the shared [`LlmClient`].
pub struct LlmIntentClassifier {
    llm: Arc<LlmClient>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, latest_user_text: &str) -> Intent {
        let prompt = format!("Message: \"{latest_user_text}\"");
        match self.llm.complete(Some(CLASSIFY_PROMPT), &prompt).await {
            Ok(label) => {
                let intent = Intent::from_label(&label);
                debug!(%intent, raw_label = %label.trim(), "Intent classified");
                intent
            }
            Err(e) => {
                warn!(error = %e, "Intent classification failed, defaulting to unknown");
                Intent::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bharti_core::{BhartiError, BhartiResult};
    use bharti_llm::LlmBackend;
    use std::sync::Mutex;

    /// Backend that replays a fixed script of replies.
    struct ScriptedBackend {
        replies: Mutex<Vec<BhartiResult<String>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<BhartiResult<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn complete(&self, _system: Option<&str>, _prompt: &str) -> BhartiResult<String> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(BhartiError::Http("script exhausted".into())))
        }
    }

    fn classifier_with(reply: BhartiResult<String>) -> LlmIntentClassifier {
        let client = LlmClient::from_backend(Box::new(ScriptedBackend::new(vec![reply])));
        LlmIntentClassifier::new(Arc::new(client))
    }

    #[tokio::test]
    async fn exact_label_is_parsed() {
        let classifier = classifier_with(Ok("Greeting".into()));
        assert_eq!(classifier.classify("Hi").await, Intent::Greeting);
    }

    #[tokio::test]
    async fn padded_label_is_trimmed() {
        let classifier = classifier_with(Ok("  Specialised \n".into()));
        assert_eq!(
            classifier.classify("show me ebooks").await,
            Intent::Specialised
        );
    }

    #[tokio::test]
    async fn explanation_text_degrades_to_unknown() {
        let classifier = classifier_with(Ok("The intent is Greeting because...".into()));
        assert_eq!(classifier.classify("Hi").await, Intent::Unknown);
    }

    #[tokio::test]
    async fn llm_error_degrades_to_unknown() {
        let classifier = classifier_with(Err(BhartiError::Http("timeout".into())));
        assert_eq!(classifier.classify("Hi").await, Intent::Unknown);
    }

    #[tokio::test]
    async fn empty_message_still_classifies() {
        let classifier = classifier_with(Ok("Unknown".into()));
        assert_eq!(classifier.classify("").await, Intent::Unknown);
    }
}
