//! Embedding generation job
//!
//! Walks the product table one row at a time: embed, then write the vector
//! back. A failing row is logged, recorded in the report and skipped.

use semsearch_core::{EmbeddingReport, Product, ProductRepository, Result};
use semsearch_vector::{EmbeddingClient, VectorStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Sequential embedding job over the product table
pub struct EmbeddingJob {
    products: Arc<dyn ProductRepository>,
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl EmbeddingJob {
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

    /// Run the job.
    ///
    /// With `only_missing` set, rows that already carry an embedding are
    /// skipped; otherwise every row is re-embedded. Only the initial fetch
    /// can fail the whole run.
    pub async fn run(&self, only_missing: bool) -> Result<EmbeddingReport> {
        let products = self.products.list_products(only_missing).await?;

        info!(
            count = products.len(),
            only_missing,
            model = self.embedder.model(),
            "Starting embedding job"
        );

        let mut report = EmbeddingReport {
            scanned: products.len(),
            ..Default::default()
        };

        for product in &products {
            match self.embed_product(product).await {
                Ok(dimension) => {
                    info!(product_id = product.id, dimension, "Updated embedding");
                    report.record_success();
                }
                Err(e) => {
                    warn!(product_id = product.id, error = %e, "Failed to embed product");
                    report.record_failure(product.id, e);
                }
            }
        }

        info!(
            scanned = report.scanned,
            updated = report.updated,
            failed = report.failed(),
            "Finished generating embeddings"
        );

        Ok(report)
    }

    async fn embed_product(&self, product: &Product) -> Result<usize> {
        let embedding = self.embedder.embed(&product.embedding_text()).await?;
        self.vectors.store_embedding(product.id, &embedding).await?;
        Ok(embedding.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEmbedder, InMemoryCatalog};

    fn job(catalog: &Arc<InMemoryCatalog>, embedder: &Arc<FakeEmbedder>) -> EmbeddingJob {
        EmbeddingJob::new(catalog.clone(), catalog.clone(), embedder.clone())
    }

    #[tokio::test]
    async fn test_one_request_and_one_write_per_product() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("Lamp", "Warm light"),
            ("Desk", "Oak top"),
            ("Chair", ""),
        ]));
        let embedder = Arc::new(FakeEmbedder::default());

        let report = job(&catalog, &embedder).run(false).await.unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.updated, 3);
        assert!(report.failures.is_empty());
        assert_eq!(embedder.call_count(), 3);
        assert_eq!(catalog.embedding_writes(), 3);
        assert_eq!(
            embedder.prompts(),
            vec!["Lamp Warm light", "Desk Oak top", "Chair"]
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_does_not_stop_the_job() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("Lamp", "Warm light"),
            ("Broken", "explodes"),
            ("Chair", "Pine"),
        ]));
        let embedder = Arc::new(FakeEmbedder::failing_on("Broken explodes"));

        let report = job(&catalog, &embedder).run(false).await.unwrap();

        assert_eq!(embedder.call_count(), 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].product_id, 2);
        assert_eq!(catalog.embedding_writes(), 2);
        assert!(catalog.embedding_of(2).is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[("Lamp", ""), ("Desk", "")]));
        catalog.fail_writes_for(1);
        let embedder = Arc::new(FakeEmbedder::default());

        let report = job(&catalog, &embedder).run(false).await.unwrap();

        assert_eq!(embedder.call_count(), 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failures[0].product_id, 1);
    }

    #[tokio::test]
    async fn test_only_missing_skips_embedded_rows() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[("Lamp", ""), ("Desk", "")]));
        let embedder = Arc::new(FakeEmbedder::default());
        job(&catalog, &embedder).run(false).await.unwrap();

        catalog.add_product("Sofa", "Green");
        let report = job(&catalog, &embedder).run(true).await.unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let catalog = Arc::new(InMemoryCatalog::default());
        catalog.fail_reads();
        let embedder = Arc::new(FakeEmbedder::default());

        assert!(job(&catalog, &embedder).run(false).await.is_err());
        assert_eq!(embedder.call_count(), 0);
    }
}
