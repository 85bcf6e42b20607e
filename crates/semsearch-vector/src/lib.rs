//! semsearch Vector - Embeddings and similarity search
//!
//! Provides the embedding client for the local model server and
//! the pgvector-backed store used for nearest-neighbour queries.

use async_trait::async_trait;
use semsearch_core::{Result, SearchMatch};

pub mod embedding;
pub mod pgvector_store;

pub use embedding::{EmbeddingClient, OllamaEmbedding};
pub use pgvector_store::PgVectorStore;

/// Trait for vector database operations
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Attach an embedding to an existing product row
    async fn store_embedding(&self, product_id: i64, embedding: &[f32]) -> Result<()>;

    /// Nearest products to `query_vector`, best match first.
    ///
    /// Returns at most `limit` rows. Rows without an embedding never match,
    /// and rows below `min_similarity` are dropped when it is set.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchMatch>>;
}
