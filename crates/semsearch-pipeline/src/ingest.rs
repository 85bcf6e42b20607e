//! Product ingestion
//!
//! Inserts a product and attaches the embedding of its description
//! (or of its name when the description is blank).

use semsearch_core::{NewProduct, Product, ProductRepository, Result, SemsearchError};
use semsearch_vector::{EmbeddingClient, VectorStore};
use std::sync::Arc;
use tracing::info;

pub struct ProductIngest {
    products: Arc<dyn ProductRepository>,
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl ProductIngest {
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

    /// Embed and insert a new product.
    ///
    /// The embedding is requested before the insert, so an unreachable model
    /// server leaves the table untouched. The insert and the embedding write
    /// are two separate statements.
    pub async fn add(&self, product: NewProduct) -> Result<Product> {
        if product.product_name.trim().is_empty() {
            return Err(SemsearchError::ValidationError(
                "Product name cannot be empty".to_string(),
            ));
        }

        let text = match product.description.trim() {
            "" => product.product_name.trim(),
            description => description,
        };
        let embedding = self.embedder.embed(text).await?;

        let created = self.products.create_product(&product).await?;
        self.vectors.store_embedding(created.id, &embedding).await?;

        info!(product_id = created.id, "Added product");
        Ok(created)
    }
}
