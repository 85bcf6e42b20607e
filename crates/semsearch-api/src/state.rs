//! Application state management

use semsearch_core::config::AppConfig;
use semsearch_pipeline::{
    Backends, EmbeddingJob, MetadataBackfill, ProductIngest, SimilaritySearch,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Product store, vector store and embedding client
    pub backends: Backends,
}

impl AppState {
    /// Create new application state with config and connected backends
    pub fn new(config: AppConfig, backends: Backends) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            backends,
        }
    }

    /// Build state with in-memory backends
    #[cfg(feature = "test-utils")]
    pub fn for_testing(
        config: AppConfig,
        catalog: std::sync::Arc<semsearch_pipeline::testing::InMemoryCatalog>,
        embedder: std::sync::Arc<semsearch_pipeline::testing::FakeEmbedder>,
    ) -> Self {
        Self::new(config, Backends::new(catalog.clone(), catalog, embedder))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check that the product store answers
    pub async fn is_ready(&self) -> bool {
        match self.backends.products.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                false
            }
        }
    }

    pub fn embedding_job(&self) -> EmbeddingJob {
        self.backends.embedding_job()
    }

    pub fn similarity_search(&self) -> SimilaritySearch {
        self.backends.similarity_search(self.config.search.clone())
    }

    pub fn metadata_backfill(&self) -> MetadataBackfill {
        self.backends.metadata_backfill()
    }

    pub fn product_ingest(&self) -> ProductIngest {
        self.backends.product_ingest()
    }
}
