//! Retrieval layer for the Bharti backend.
//!
//! Two stages back every catalog query: a semantic similarity search over
//! title embeddings yields candidate row ids, then the relational catalog is
//! consulted for the full rows. Both stages are best-effort from the
//! pipeline's point of view; the resolver above treats any failure as an
//! empty result.

pub mod catalog;
pub mod embedding;
pub mod similarity;
pub mod store;

pub use catalog::{CatalogStore, SqliteCatalog};
pub use embedding::{EmbeddingProvider, LocalEmbedding, RemoteEmbedding};
pub use similarity::{SimilaritySearch, TitleIndex};
pub use store::{InMemoryVectorStore, ScoredTitle, TitleEntry, VectorStore};
