//! semsearch Pipeline - embedding generation and similarity search
//!
//! Each job is a single sequential pass over the product table:
//! - [`EmbeddingJob`]: embed every product and write the vector back
//! - [`SimilaritySearch`]: embed a query and ask the vector store for neighbours
//! - [`MetadataBackfill`]: rebuild the metadata column from name and description
//! - [`ProductIngest`]: insert a new product together with its embedding

pub mod backfill;
pub mod embedding_job;
pub mod ingest;
pub mod search;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backfill::MetadataBackfill;
pub use embedding_job::EmbeddingJob;
pub use ingest::ProductIngest;
pub use search::SimilaritySearch;

use semsearch_core::{AppConfig, ProductRepository, ProductStore, Result, SearchConfig};
use semsearch_vector::{EmbeddingClient, OllamaEmbedding, PgVectorStore, VectorStore};
use std::sync::Arc;

/// Shared handles to the external collaborators
#[derive(Clone)]
pub struct Backends {
    pub products: Arc<dyn ProductRepository>,
    pub vectors: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn EmbeddingClient>,
}

impl Backends {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        vectors: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
    ) -> Self {
        Self {
            products,
            vectors,
            embedder,
        }
    }

    /// Connect to PostgreSQL and build the Ollama client from config
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let store = ProductStore::new(&config.database).await?;
        let vectors = PgVectorStore::new(store.pool().clone());
        let embedder = OllamaEmbedding::from_config(&config.embedding)?;

        tracing::info!(
            model = %config.embedding.model,
            url = %config.embedding.base_url,
            "backends connected"
        );

        Ok(Self::new(
            Arc::new(store),
            Arc::new(vectors),
            Arc::new(embedder),
        ))
    }

    pub fn embedding_job(&self) -> EmbeddingJob {
        EmbeddingJob::new(
            self.products.clone(),
            self.vectors.clone(),
            self.embedder.clone(),
        )
    }

    pub fn similarity_search(&self, config: SearchConfig) -> SimilaritySearch {
        SimilaritySearch::new(self.vectors.clone(), self.embedder.clone(), config)
    }

    pub fn metadata_backfill(&self) -> MetadataBackfill {
        MetadataBackfill::new(self.products.clone())
    }

    pub fn product_ingest(&self) -> ProductIngest {
        ProductIngest::new(
            self.products.clone(),
            self.vectors.clone(),
            self.embedder.clone(),
        )
    }
}
