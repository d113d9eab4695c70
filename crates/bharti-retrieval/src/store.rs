use bharti_core::{BhartiError, BhartiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A catalog title held in the vector store, keyed by its relational row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleEntry {
    /// Relational catalog row id this embedding belongs to.
    pub id: i64,
    /// The embedded title text.
    pub title: String,
    /// The title's embedding vector.
    pub embedding: Vec<f32>,
}

/// Result of a semantic search query.
#[derive(Debug, Clone)]
pub struct ScoredTitle {
    pub entry: TitleEntry,
    pub score: f32,
}

/// Trait for vector storage backends holding catalog title embeddings.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a title entry.
    async fn insert(&self, entry: TitleEntry) -> BhartiResult<()>;

    /// Search for the top-k entries most similar to a query embedding.
    async fn search(&self, query_embedding: &[f32], top_k: usize)
        -> BhartiResult<Vec<ScoredTitle>>;

    /// Count entries.
    async fn count(&self) -> BhartiResult<usize>;
}

/// In-memory vector store using brute-force cosine similarity.
/// Suitable for catalog-scale datasets (tens of thousands of titles).
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<TitleEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, entry: TitleEntry) -> BhartiResult<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> BhartiResult<Vec<ScoredTitle>> {
        if query_embedding.is_empty() {
            return Err(BhartiError::Retrieval("Empty query embedding".to_string()));
        }

        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredTitle> = entries
            .iter()
            .map(|e| ScoredTitle {
                entry: e.clone(),
                score: cosine_similarity(query_embedding, &e.embedding),
            })
            .collect();

        // Sort by score descending
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> BhartiResult<usize> {
        let entries = self.entries.read().await;
        Ok(entries.len())
    }
}

/// Cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}
