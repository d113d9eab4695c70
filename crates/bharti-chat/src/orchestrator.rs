use crate::context::ContextResolver;
use crate::generate::ResponseGenerator;
use crate::intent::IntentClassifier;
use bharti_core::{Answer, BhartiError, BhartiResult, Language, Turn};
use bharti_session::{SessionId, SessionStore};
use std::sync::Arc;
use tracing::info;

/// Drives the per-message pipeline: classify → resolve context → generate →
/// append turns. A linear pipeline with one branch point (the intent), so it
/// is a plain match dispatch rather than a graph executor.
///
/// Every branch terminates in an answer; component failures below surface as
/// degraded answer payloads. The only error returned is [`BhartiError::NoAnswer`]
/// when no generator branch produced output at all.
pub struct ConversationOrchestrator {
    classifier: Arc<dyn IntentClassifier>,
    resolver: ContextResolver,
    generator: ResponseGenerator,
    sessions: Arc<dyn SessionStore>,
}

impl ConversationOrchestrator {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        resolver: ContextResolver,
        generator: ResponseGenerator,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            classifier,
            resolver,
            generator,
            sessions,
        }
    }

    /// The session id new messages run against.
    pub fn active_session(&self) -> SessionId {
        self.sessions.active()
    }

    /// Handle one incoming message end to end.
    ///
    /// The session lock is held for the whole pipeline so concurrent
    /// requests against the same id cannot interleave their history.
    pub async fn handle_message(
        &self,
        session_id: SessionId,
        query: &str,
        language: Language,
    ) -> BhartiResult<Answer> {
        let session = self.sessions.get_or_create(session_id).await;
        let mut session = session.lock().await;

        let intent = self.classifier.classify(query).await;
        info!(session_id, %intent, "Intent classified");

        let context = self.resolver.resolve(intent, query).await;
        let transcript = session.transcript();

        let answer = self
            .generator
            .generate(intent, &context, &transcript, query, language)
            .await;

        if answer_is_empty(&answer) {
            return Err(BhartiError::NoAnswer(
                "no generator branch produced output".to_string(),
            ));
        }

        session.push_turn(Turn::user(query));
        session.push_turn(Turn::assistant(answer.clone(), intent));
        info!(session_id, turns = session.turn_count(), "Turn answered");

        Ok(answer)
    }

    /// Rotate the active session id. The answer just produced (and the old
    /// session's history) are left intact; only the active id changes.
    pub fn clear_memory(&self) -> SessionId {
        let new_id = self.sessions.rotate();
        info!(new_session_id = new_id, "Memory cleared, session rotated");
        new_id
    }
}

fn answer_is_empty(answer: &Answer) -> bool {
    match answer {
        Answer::Text(text) => text.trim().is_empty(),
        // An empty section list still signals "nothing matched" explicitly;
        // only text answers can be degenerately empty.
        Answer::Structured(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Translator;
    use bharti_core::{BhartiResult, CategoryRecord, Intent, Role};
    use bharti_llm::{LlmBackend, LlmClient};
    use bharti_retrieval::{CatalogStore, SimilaritySearch};
    use bharti_session::InMemorySessionStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedClassifier(Intent);

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Intent {
            self.0
        }
    }

    struct ScriptedBackend {
        replies: Mutex<Vec<BhartiResult<String>>>,
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn complete(&self, _system: Option<&str>, _prompt: &str) -> BhartiResult<String> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok("fallback reply".to_string()))
        }
    }

    struct NoopTranslator;

    #[async_trait]
    impl Translator for NoopTranslator {
        async fn translate(&self, text: &str, _language: Language) -> String {
            text.to_string()
        }
    }

    struct StubSearch {
        ids: Vec<i64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SimilaritySearch for StubSearch {
        async fn search(&self, _query: &str) -> BhartiResult<Vec<i64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ids.clone())
        }
    }

    struct StubCatalog {
        rows: Vec<CategoryRecord>,
    }

    #[async_trait]
    impl CatalogStore for StubCatalog {
        async fn fetch_by_ids(&self, _ids: &[i64]) -> BhartiResult<Vec<CategoryRecord>> {
            Ok(self.rows.clone())
        }

        async fn fetch_all(&self) -> BhartiResult<Vec<CategoryRecord>> {
            Ok(self.rows.clone())
        }
    }

    fn build_orchestrator(
        intent: Intent,
        replies: Vec<BhartiResult<String>>,
        candidate_ids: Vec<i64>,
    ) -> (ConversationOrchestrator, Arc<StubSearch>) {
        let llm = Arc::new(LlmClient::from_backend(Box::new(ScriptedBackend {
            replies: Mutex::new(replies.into_iter().rev().collect()),
        })));
        let search = Arc::new(StubSearch {
            ids: candidate_ids,
            calls: AtomicUsize::new(0),
        });
        let catalog = Arc::new(StubCatalog {
            rows: vec![CategoryRecord {
                id: 1,
                category: "forts".into(),
                title: "Red Fort".into(),
                description: "Mughal fort".into(),
                url: "https://portal/forts/1".into(),
            }],
        });
        let resolver = ContextResolver::new(search.clone(), catalog);
        let generator = ResponseGenerator::new(llm, Arc::new(NoopTranslator));
        let orchestrator = ConversationOrchestrator::new(
            Arc::new(FixedClassifier(intent)),
            resolver,
            generator,
            Arc::new(InMemorySessionStore::new()),
        );
        (orchestrator, search)
    }

    #[tokio::test]
    async fn greeting_answers_and_appends_both_turns() {
        let (orchestrator, search) =
            build_orchestrator(Intent::Greeting, vec![Ok("Namaste!".into())], vec![1]);
        let id = orchestrator.active_session();

        let answer = orchestrator
            .handle_message(id, "Hi", Language::English)
            .await
            .unwrap();
        assert_eq!(answer, Answer::Text("Namaste!".into()));
        // Greeting never touches retrieval.
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);

        let session = orchestrator.sessions.get_or_create(id).await;
        let session = session.lock().await;
        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.turns[0].role, Role::User);
        assert_eq!(session.turns[1].role, Role::Assistant);
        assert_eq!(session.turns[1].intent, Some(Intent::Greeting));
    }

    #[tokio::test]
    async fn specialised_flows_through_retrieval_and_repair() {
        let valid = r#"[{"category":"forts","description":"Mughal forts","resources":[{"title":"Red Fort","url":"https://portal/forts/1"}]}]"#;
        let (orchestrator, search) =
            build_orchestrator(Intent::Specialised, vec![Ok(valid.into())], vec![1]);
        let id = orchestrator.active_session();

        let answer = orchestrator
            .handle_message(id, "Tell me about Mughal forts", Language::English)
            .await
            .unwrap();
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        let Answer::Structured(sections) = answer else {
            panic!("expected structured answer");
        };
        assert_eq!(sections[0].resources.len(), 1);
    }

    #[tokio::test]
    async fn empty_text_answer_is_no_answer_error() {
        let (orchestrator, _) =
            build_orchestrator(Intent::Greeting, vec![Ok("   ".into())], vec![]);
        let id = orchestrator.active_session();

        let err = orchestrator
            .handle_message(id, "Hi", Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, BhartiError::NoAnswer(_)));

        // Failed turns leave no partial history behind.
        let session = orchestrator.sessions.get_or_create(id).await;
        assert_eq!(session.lock().await.turn_count(), 0);
    }

    #[tokio::test]
    async fn clear_memory_rotates_to_fresh_history() {
        let (orchestrator, _) = build_orchestrator(
            Intent::Greeting,
            vec![Ok("Namaste!".into()), Ok("Hello again!".into())],
            vec![],
        );
        let first_id = orchestrator.active_session();
        orchestrator
            .handle_message(first_id, "Hi", Language::English)
            .await
            .unwrap();

        let second_id = orchestrator.clear_memory();
        assert_ne!(second_id, first_id);
        assert_eq!(orchestrator.active_session(), second_id);

        orchestrator
            .handle_message(second_id, "Hi again", Language::English)
            .await
            .unwrap();

        let old = orchestrator.sessions.get_or_create(first_id).await;
        let new = orchestrator.sessions.get_or_create(second_id).await;
        assert_eq!(old.lock().await.turn_count(), 2);
        assert_eq!(new.lock().await.turn_count(), 2);
    }

    #[tokio::test]
    async fn clear_memory_twice_rotates_twice() {
        let (orchestrator, _) = build_orchestrator(Intent::Greeting, vec![], vec![]);
        let start = orchestrator.active_session();
        let first = orchestrator.clear_memory();
        let second = orchestrator.clear_memory();
        assert!(first > start);
        assert!(second > first);
    }
}
