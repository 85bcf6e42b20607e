//! Query embedding + similarity search
//!
//! The query is embedded with the same model as the products and the
//! nearest-neighbour ranking is left to the vector store.

use semsearch_core::{Result, SearchConfig, SearchMatch, SemsearchError};
use semsearch_vector::{EmbeddingClient, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Similarity search over embedded products
pub struct SimilaritySearch {
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
    config: SearchConfig,
}

impl SimilaritySearch {
    pub fn new(
        vectors: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
        config: SearchConfig,
    ) -> Self {
        Self {
            vectors,
            embedder,
            config,
        }
    }

    /// Search for products similar to `query`.
    ///
    /// `match_count` falls back to the configured default and is clamped to
    /// the configured maximum; `match_threshold` falls back to the
    /// configured threshold.
    pub async fn search(
        &self,
        query: &str,
        match_count: Option<usize>,
        match_threshold: Option<f32>,
    ) -> Result<Vec<SearchMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SemsearchError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let limit = self.config.effective_match_count(match_count);
        let threshold = match_threshold.or(self.config.match_threshold);

        let query_vector = self.embedder.embed(query).await?;
        debug!(query, limit, ?threshold, "Running similarity search");

        let mut matches = self.vectors.search(&query_vector, limit, threshold).await?;
        matches.truncate(limit);

        debug!(results = matches.len(), "Similarity search completed");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEmbedder, InMemoryCatalog};
    use crate::EmbeddingJob;

    async fn indexed_catalog(count: usize) -> (Arc<InMemoryCatalog>, Arc<FakeEmbedder>) {
        let catalog = Arc::new(InMemoryCatalog::default());
        for i in 0..count {
            catalog.add_product(&format!("Lamp model {i}"), "Warm light");
        }
        let embedder = Arc::new(FakeEmbedder::default());
        EmbeddingJob::new(catalog.clone(), catalog.clone(), embedder.clone())
            .run(false)
            .await
            .unwrap();
        (catalog, embedder)
    }

    #[tokio::test]
    async fn test_results_bounded_by_match_count() {
        let (catalog, embedder) = indexed_catalog(10).await;
        let search = SimilaritySearch::new(catalog, embedder, SearchConfig::default());

        assert_eq!(search.search("lamp", None, None).await.unwrap().len(), 5);
        assert_eq!(search.search("lamp", Some(2), None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_requested_count_is_clamped() {
        let (catalog, embedder) = indexed_catalog(10).await;
        let config = SearchConfig {
            max_match_count: 3,
            ..Default::default()
        };
        let search = SimilaritySearch::new(catalog, embedder, config);

        assert_eq!(search.search("lamp", Some(100), None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_best_match_first() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("zzzz", "zzzz"),
            ("desk lamp", "warm light"),
        ]));
        let embedder = Arc::new(FakeEmbedder::default());
        EmbeddingJob::new(catalog.clone(), catalog.clone(), embedder.clone())
            .run(false)
            .await
            .unwrap();

        let search = SimilaritySearch::new(catalog, embedder, SearchConfig::default());
        let results = search.search("desk lamp warm light", None, None).await.unwrap();

        assert_eq!(results[0].product_name, "desk lamp");
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[tokio::test]
    async fn test_threshold_filters() {
        let (catalog, embedder) = indexed_catalog(4).await;
        let search = SimilaritySearch::new(catalog, embedder, SearchConfig::default());

        let results = search.search("lamp", None, Some(1.5)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_vector_rows_never_match() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("Lamp", "Warm light"),
            ("---", ""),
        ]));
        let embedder = Arc::new(FakeEmbedder::default());
        EmbeddingJob::new(catalog.clone(), catalog.clone(), embedder.clone())
            .run(false)
            .await
            .unwrap();
        assert!(catalog.embedding_of(2).unwrap().iter().all(|x| *x == 0.0));

        let search = SimilaritySearch::new(catalog, embedder, SearchConfig::default());
        let results = search.search("lamp", None, Some(0.0)).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "Lamp");
        assert!(results[0].similarity.is_finite());
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_embedding() {
        let (catalog, embedder) = indexed_catalog(1).await;
        let calls_before = embedder.call_count();
        let search = SimilaritySearch::new(catalog, embedder.clone(), SearchConfig::default());

        let err = search.search("   ", None, None).await.unwrap_err();
        assert!(matches!(err, SemsearchError::ValidationError(_)));
        assert_eq!(embedder.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let (catalog, _) = indexed_catalog(1).await;
        let embedder = Arc::new(FakeEmbedder::failing_on("lamp"));
        let search = SimilaritySearch::new(catalog, embedder, SearchConfig::default());

        let err = search.search("lamp", None, None).await.unwrap_err();
        assert!(matches!(err, SemsearchError::EmbeddingError(_)));
    }
}
