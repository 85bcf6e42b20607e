//! PostgreSQL product store
//!
//! Reads and writes rows of the `products` table using SQLx.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{DatabaseConfig, NewProduct, Product, ProductMetadata, Result, SemsearchError};

const PRODUCT_COLUMNS: &str = "id, product_name, description, metadata, created_at";

/// PostgreSQL product store
#[derive(Clone)]
pub struct ProductStore {
    pool: PgPool,
}

impl ProductStore {
    /// Create a new product store connection
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = connect(config).await?;
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Open a PostgreSQL pool from config
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect(&config.postgres_url)
        .await
        .map_err(|e| SemsearchError::DatabaseError(format!("PostgreSQL connection failed: {e}")))
}

/// Trait for product row operations
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products in id order, optionally only those without an embedding
    async fn list_products(&self, only_missing_embedding: bool) -> Result<Vec<Product>>;

    /// Round-trip to the store, used by the readiness probe
    async fn ping(&self) -> Result<()>;

    /// Insert a product and return the stored row
    async fn create_product(&self, product: &NewProduct) -> Result<Product>;

    /// Replace the metadata column of one row, returning the updated row
    async fn replace_metadata(&self, id: i64, metadata: &ProductMetadata)
        -> Result<Option<Product>>;
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list_products(&self, only_missing_embedding: bool) -> Result<Vec<Product>> {
        let filter = if only_missing_embedding {
            "WHERE embedding IS NULL"
        } else {
            ""
        };
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products {filter} ORDER BY id");

        sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SemsearchError::DatabaseError(format!("Failed to list products: {e}")))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| SemsearchError::DatabaseError(format!("PostgreSQL unreachable: {e}")))
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (product_name, description, metadata)
            VALUES ($1, $2, $3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(&product.product_name)
            .bind(&product.description)
            .bind(product.metadata().to_json())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SemsearchError::DatabaseError(format!("Failed to create product: {e}")))
    }

    async fn replace_metadata(
        &self,
        id: i64,
        metadata: &ProductMetadata,
    ) -> Result<Option<Product>> {
        let sql = format!(
            "UPDATE products SET metadata = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(metadata.to_json())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SemsearchError::DatabaseError(format!("Failed to update product: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires PostgreSQL with the products table"]
    async fn test_create_and_list() {
        let config = crate::AppConfig::from_env().unwrap();
        let store = ProductStore::new(&config.database).await.unwrap();

        let created = store
            .create_product(&NewProduct::new("Test Lamp", "A lamp for tests"))
            .await
            .unwrap();
        assert_eq!(created.metadata["product_name"], "Test Lamp");

        let all = store.list_products(false).await.unwrap();
        assert!(all.iter().any(|p| p.id == created.id));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_ping() {
        let config = crate::AppConfig::from_env().unwrap();
        let store = ProductStore::new(&config.database).await.unwrap();
        store.ping().await.unwrap();
    }
}
