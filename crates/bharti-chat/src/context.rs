use bharti_core::{CategoryRecord, Intent};
use bharti_retrieval::{CatalogStore, SimilaritySearch};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default cap on the retrieval context handed to generation, in words.
pub const DEFAULT_MAX_CONTEXT_WORDS: usize = 400;

/// Decides whether and how to retrieve catalog context for an intent.
///
/// Only `Specialised` touches the retrieval services; every other intent is
/// a side-effect-free fast path returning empty context. Retrieval itself is
/// best-effort: any failure is logged and treated as "no candidates", never
/// propagated.
pub struct ContextResolver {
    search: Arc<dyn SimilaritySearch>,
    catalog: Arc<dyn CatalogStore>,
    max_context_words: usize,
}

impl ContextResolver {
    pub fn new(search: Arc<dyn SimilaritySearch>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            search,
            catalog,
            max_context_words: DEFAULT_MAX_CONTEXT_WORDS,
        }
    }

    /// Override the word cap applied to the serialized context block.
    pub fn with_max_context_words(mut self, max_context_words: usize) -> Self {
        self.max_context_words = max_context_words;
        self
    }

    /// Produce the context payload for the given intent and latest user text.
    /// Returns an empty string for intents that need no retrieval, when no
    /// candidate matches, or when retrieval fails.
    pub async fn resolve(&self, intent: Intent, latest_user_text: &str) -> String {
        if !intent.needs_retrieval() {
            return String::new();
        }

        let candidate_ids = match self.search.search(latest_user_text).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Similarity search failed, continuing without context");
                return String::new();
            }
        };

        if candidate_ids.is_empty() {
            debug!("No similar titles found");
            return String::new();
        }

        let records = match self.catalog.fetch_by_ids(&candidate_ids).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, continuing without context");
                return String::new();
            }
        };

        truncate_words(&render_records(&records), self.max_context_words)
    }
}

/// Serialize catalog rows as a flat text block, one line per record.
fn render_records(records: &[CategoryRecord]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "category: {} | title: {} | description: {} | url: {}\n",
            r.category, r.title, r.description, r.url
        ));
    }
    out
}

/// Keep only the first `max_words` whitespace-separated words.
fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.trim_end().to_string();
    }
    words[..max_words].join(" ")
}
