use crate::catalog::CatalogStore;
use crate::embedding::EmbeddingProvider;
use crate::store::{TitleEntry, VectorStore};
use bharti_core::BhartiResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Free-text similarity search returning candidate catalog row ids.
///
/// Implemented by [`TitleIndex`]; the chat layer depends on this trait so
/// tests can record and script retrieval calls.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Return candidate row ids above the relevance threshold, best first.
    async fn search(&self, query: &str) -> BhartiResult<Vec<i64>>;
}

/// Default number of candidates pulled from the vector store per query.
pub const DEFAULT_TOP_K: usize = 10;

/// Default relevance threshold; candidates scoring below it are dropped.
pub const DEFAULT_THRESHOLD: f32 = 0.40;

/// Semantic similarity search over catalog title embeddings.
///
/// Given free text, returns the catalog row ids whose titles score at or
/// above the relevance threshold, best first. An empty result is a normal
/// outcome, not an error.
pub struct TitleIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    threshold: f32,
}

impl TitleIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the candidate count per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Override the relevance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Embed every catalog title into the vector store, keyed by row id.
    /// Returns the number of titles indexed.
    pub async fn index_catalog(&self, catalog: &dyn CatalogStore) -> BhartiResult<usize> {
        let records = catalog.fetch_all().await?;
        let mut indexed = 0usize;
        for record in &records {
            if record.title.is_empty() {
                continue;
            }
            let embedding = self.embedder.embed(&record.title).await?;
            self.store
                .insert(TitleEntry {
                    id: record.id,
                    title: record.title.clone(),
                    embedding,
                })
                .await?;
            indexed += 1;
        }
        info!(indexed, "Catalog titles indexed");
        Ok(indexed)
    }
}

#[async_trait]
impl SimilaritySearch for TitleIndex {
    async fn search(&self, query: &str) -> BhartiResult<Vec<i64>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, self.top_k).await?;

        let ids: Vec<i64> = results
            .iter()
            .filter(|r| r.score >= self.threshold)
            .map(|r| r.entry.id)
            .collect();

        debug!(
            candidates = results.len(),
            above_threshold = ids.len(),
            "Similarity search completed"
        );
        Ok(ids)
    }
}
