use bharti_core::{Answer, Language};
use bharti_llm::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

const TRANSLATE_PROMPT: &str = "Translate the following text to Hindi. Preserve all markup, \
punctuation, emojis and formatting exactly. Return only the translated text.";

/// Best-effort text translation. On any failure the original text is
/// returned unchanged; a translation problem never fails a request.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single text field to the target language.
    async fn translate(&self, text: &str, language: Language) -> String;
}

/// Translator backed by the shared [`LlmClient`].
pub struct LlmTranslator {
    llm: Arc<LlmClient>,
}

impl LlmTranslator {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, language: Language) -> String {
        if language == Language::English || text.is_empty() {
            return text.to_string();
        }
        match self.llm.complete(Some(TRANSLATE_PROMPT), text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "Translation failed, returning original text");
                text.to_string()
            }
        }
    }
}

/// Apply translation to an answer.
///
/// Text answers are translated whole. Structured answers translate only the
/// `category` and `description` fields; resource titles and urls stay
/// byte-identical to the English draft.
pub async fn translate_answer(
    translator: &dyn Translator,
    answer: Answer,
    language: Language,
) -> Answer {
    if language == Language::English {
        return answer;
    }
    match answer {
        Answer::Text(text) => Answer::Text(translator.translate(&text, language).await),
        Answer::Structured(mut sections) => {
            for section in &mut sections {
                section.category = translator.translate(&section.category, language).await;
                section.description = translator.translate(&section.description, language).await;
            }
            Answer::Structured(sections)
        }
    }
}
