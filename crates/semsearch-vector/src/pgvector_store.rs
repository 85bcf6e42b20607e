//! pgvector implementation for vector storage
//!
//! Embeddings live in the `embedding` column of the `products` table and
//! nearest-neighbour queries use the extension's cosine distance operator
//! (`<=>`). Similarity is reported as `1 - distance`. Zero-norm vectors
//! have a NaN distance and are never returned.

use async_trait::async_trait;
use pgvector::Vector;
use semsearch_core::{Result, SearchMatch, SemsearchError};
use sqlx::postgres::PgPool;

const SEARCH_SQL: &str = r#"
    SELECT
        id, product_name, description, metadata,
        (1 - (embedding <=> $1))::real AS similarity
    FROM products
    WHERE embedding IS NOT NULL
      AND (embedding <=> $1) <> 'NaN'::float8
      AND ($3::real IS NULL OR 1 - (embedding <=> $1) >= $3)
    ORDER BY embedding <=> $1
    LIMIT $2
"#;

/// pgvector-backed store sharing the product pool
#[derive(Clone)]
pub struct PgVectorStore {
    pool: PgPool,
}

impl PgVectorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl super::VectorStore for PgVectorStore {
    async fn store_embedding(&self, product_id: i64, embedding: &[f32]) -> Result<()> {
        let result = sqlx::query("UPDATE products SET embedding = $2 WHERE id = $1")
            .bind(product_id)
            .bind(Vector::from(embedding.to_vec()))
            .execute(&self.pool)
            .await
            .map_err(|e| SemsearchError::DatabaseError(format!("Failed to store embedding: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(SemsearchError::NotFound(format!("product {product_id}")));
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchMatch>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        sqlx::query_as::<_, SearchMatch>(SEARCH_SQL)
            .bind(Vector::from(query_vector.to_vec()))
            .bind(limit)
            .bind(min_similarity)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SemsearchError::SearchError(format!("Vector search failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorStore;
    use semsearch_core::{AppConfig, NewProduct, ProductRepository, ProductStore};

    #[tokio::test]
    #[ignore = "requires PostgreSQL with pgvector"]
    async fn test_store_and_search() {
        let config = AppConfig::from_env().unwrap();
        let products = ProductStore::new(&config.database).await.unwrap();
        let vectors = PgVectorStore::new(products.pool().clone());

        let lamp = products
            .create_product(&NewProduct::new("Vector Lamp", "lamp"))
            .await
            .unwrap();
        vectors
            .store_embedding(lamp.id, &[1.0, 0.0, 0.0])
            .await
            .unwrap();

        let matches = vectors.search(&[1.0, 0.0, 0.0], 3, None).await.unwrap();
        assert!(matches.len() <= 3);
        assert!(matches.iter().any(|m| m.id == lamp.id));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL with pgvector"]
    async fn test_zero_vector_excluded_from_threshold_search() {
        let config = AppConfig::from_env().unwrap();
        let products = ProductStore::new(&config.database).await.unwrap();
        let vectors = PgVectorStore::new(products.pool().clone());

        let blank = products
            .create_product(&NewProduct::new("Zero Vector", ""))
            .await
            .unwrap();
        vectors
            .store_embedding(blank.id, &[0.0, 0.0, 0.0])
            .await
            .unwrap();

        let matches = vectors
            .search(&[1.0, 0.0, 0.0], 50, Some(0.99))
            .await
            .unwrap();
        assert!(matches.iter().all(|m| m.id != blank.id));
        assert!(matches.iter().all(|m| m.similarity.is_finite()));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL with pgvector"]
    async fn test_store_embedding_missing_row() {
        let config = AppConfig::from_env().unwrap();
        let products = ProductStore::new(&config.database).await.unwrap();
        let vectors = PgVectorStore::new(products.pool().clone());

        let err = vectors.store_embedding(-1, &[0.5]).await.unwrap_err();
        assert!(matches!(err, SemsearchError::NotFound(_)));
    }
}
