use bharti_core::{AnswerSection, BhartiError, BhartiResult, Language};
use bharti_llm::LlmClient;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

const REPAIR_PROMPT: &str = "The following text was supposed to be a JSON array of objects with \
the fields \"category\", \"description\" and \"resources\" (a list of objects with \"title\" and \
\"url\"). Return the corrected JSON array only, with no surrounding prose and no content changes.";

#[allow(clippy::expect_used)]
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("code fence pattern is valid")
});

/// Validates structured model output and repairs it when malformed.
///
/// Strict two-attempt protocol: parse, one repair call on failure. Never
/// more than one repair call per generation. When both attempts fail the
/// caller substitutes [`fallback_payload`], which is already final.
pub struct ResponseRepairer {
    llm: Arc<LlmClient>,
}

impl ResponseRepairer {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Coerce raw model output into a valid section list.
    ///
    /// Returns `None` when the output is unrecoverable: the repair call
    /// failed, or its output still did not parse.
    pub async fn ensure_structured(&self, raw: &str) -> Option<Vec<AnswerSection>> {
        match parse_sections(raw) {
            Ok(sections) => Some(sections),
            Err(first_err) => {
                warn!(error = %first_err, "Structured output malformed, attempting repair");
                let repaired = match self.llm.complete(Some(REPAIR_PROMPT), raw).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Repair call failed");
                        return None;
                    }
                };
                match parse_sections(&repaired) {
                    Ok(sections) => Some(sections),
                    Err(second_err) => {
                        warn!(error = %second_err, "Repair output still malformed");
                        None
                    }
                }
            }
        }
    }
}

/// Parse raw model output as a JSON array of answer sections.
///
/// Markdown code fences are stripped first; models wrap JSON in them
/// routinely. Any shape other than a JSON array is an error.
pub fn parse_sections(raw: &str) -> BhartiResult<Vec<AnswerSection>> {
    let stripped = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&stripped)?;
    if !value.is_array() {
        return Err(BhartiError::MalformedAnswer(
            "structured answer must be a JSON array".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Fixed payload returned when generation and repair both failed. Already
/// localized for the requested language and never re-translated.
pub fn fallback_payload(language: Language) -> Vec<AnswerSection> {
    let description = match language {
        Language::English => "Proper response not returned. Please try again.",
        Language::Hindi => "उचित उत्तर प्राप्त नहीं हुआ। कृपया पुनः प्रयास करें।",
    };
    vec![AnswerSection {
        category: "Invalid".to_string(),
        description: description.to_string(),
        resources: Vec::new(),
    }]
}

fn strip_code_fences(raw: &str) -> String {
    if let Some(caps) = CODE_FENCE.captures(raw) {
        if let Some(inner) = caps.get(1) {
            return inner.as_str().to_string();
        }
    }
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bharti_core::Resource;
    use bharti_llm::LlmBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VALID: &str = r#"[{"category":"forts","description":"Mughal forts","resources":[{"title":"Red Fort","url":"https://portal/forts/1"}]}]"#;

    /// Backend counting repair calls and replying with a fixed text.
    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        reply: String,
    }

    #[async_trait]
    impl LlmBackend for CountingBackend {
        async fn complete(&self, _system: Option<&str>, _prompt: &str) -> BhartiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn repairer_replying(reply: &str) -> (ResponseRepairer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            calls: calls.clone(),
            reply: reply.to_string(),
        };
        let repairer = ResponseRepairer::new(Arc::new(LlmClient::from_backend(Box::new(backend))));
        (repairer, calls)
    }

    #[test]
    fn parse_accepts_valid_array() {
        let sections = parse_sections(VALID).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].resources[0],
            Resource {
                title: "Red Fort".into(),
                url: "https://portal/forts/1".into()
            }
        );
    }

    #[test]
    fn parse_strips_code_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        assert_eq!(parse_sections(&fenced).unwrap().len(), 1);
    }

    #[test]
    fn parse_strips_unlabelled_fences() {
        let fenced = format!("```\n{VALID}\n```");
        assert_eq!(parse_sections(&fenced).unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(parse_sections(r#"{"category":"forts"}"#).is_err());
        assert!(parse_sections("not json at all").is_err());
    }

    #[tokio::test]
    async fn valid_input_needs_no_repair_call() {
        let (repairer, calls) = repairer_replying(VALID);
        let sections = repairer.ensure_structured(VALID).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_input_repaired_once() {
        let (repairer, calls) = repairer_replying(VALID);
        let sections = repairer
            .ensure_structured("Here you go: [broken")
            .await
            .unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category, "forts");
        // Exactly one repair call, never more.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn double_failure_is_unrecoverable_after_single_repair_call() {
        let (repairer, calls) = repairer_replying("still { not json");
        let sections = repairer.ensure_structured("garbage").await;
        assert!(sections.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_repair_call_is_unrecoverable() {
        struct FailingBackend;
        #[async_trait]
        impl LlmBackend for FailingBackend {
            async fn complete(&self, _s: Option<&str>, _p: &str) -> BhartiResult<String> {
                Err(BhartiError::Http("timeout".into()))
            }
        }
        let repairer = ResponseRepairer::new(Arc::new(LlmClient::from_backend(Box::new(
            FailingBackend,
        ))));
        assert!(repairer.ensure_structured("garbage").await.is_none());
    }

    #[test]
    fn fallback_is_localized() {
        let english = fallback_payload(Language::English);
        assert_eq!(english[0].category, "Invalid");
        assert!(english[0].description.contains("Proper response"));
        assert!(english[0].resources.is_empty());

        let hindi = fallback_payload(Language::Hindi);
        assert_eq!(hindi[0].category, "Invalid");
        assert!(hindi[0].description.contains("कृपया"));
        assert!(hindi[0].resources.is_empty());
    }
}
