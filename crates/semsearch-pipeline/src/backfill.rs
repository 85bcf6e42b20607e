//! Metadata backfill
//!
//! Rewrites the `metadata` column of every product to
//! `{ product_name, product_description }`. Anything previously stored in
//! the column is lost.

use semsearch_core::{Product, ProductMetadata, ProductRepository, Result};
use std::sync::Arc;
use tracing::{info, warn};

pub struct MetadataBackfill {
    products: Arc<dyn ProductRepository>,
}

impl MetadataBackfill {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Rewrite metadata for all rows and return the rows that were updated
    pub async fn run(&self) -> Result<Vec<Product>> {
        let products = self.products.list_products(false).await?;
        let mut updated = Vec::with_capacity(products.len());

        for product in &products {
            let metadata = ProductMetadata::from_product(product);
            match self.products.replace_metadata(product.id, &metadata).await {
                Ok(Some(row)) => updated.push(row),
                Ok(None) => warn!(product_id = product.id, "Product disappeared during backfill"),
                Err(e) => warn!(product_id = product.id, error = %e, "Failed to update product"),
            }
        }

        info!(
            total = products.len(),
            updated = updated.len(),
            "Metadata backfill finished"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCatalog;
    use serde_json::json;

    #[tokio::test]
    async fn test_overwrites_metadata_for_every_row() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("Lamp", "Warm light"),
            ("Desk", "Oak top"),
        ]));
        catalog.set_metadata(1, json!({ "color": "red", "product_name": "stale" }));

        let updated = MetadataBackfill::new(catalog.clone()).run().await.unwrap();

        assert_eq!(updated.len(), 2);
        for product in catalog.snapshot() {
            assert_eq!(
                product.metadata,
                json!({
                    "product_name": product.product_name,
                    "product_description": product.description,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_name_and_description_untouched() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[
            ("Lamp", "Warm light"),
            ("Desk", ""),
        ]));
        let before = catalog.snapshot();

        MetadataBackfill::new(catalog.clone()).run().await.unwrap();

        let after = catalog.snapshot();
        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.product_name, new.product_name);
            assert_eq!(old.description, new.description);
        }
    }

    #[tokio::test]
    async fn test_failed_row_is_skipped() {
        let catalog = Arc::new(InMemoryCatalog::with_products(&[("Lamp", ""), ("Desk", "")]));
        catalog.fail_writes_for(2);

        let updated = MetadataBackfill::new(catalog.clone()).run().await.unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error() {
        let catalog = Arc::new(InMemoryCatalog::default());
        catalog.fail_reads();

        assert!(MetadataBackfill::new(catalog).run().await.is_err());
    }
}
