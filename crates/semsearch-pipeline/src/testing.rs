//! In-memory test doubles
//!
//! `InMemoryCatalog` stands in for both the product table and the vector
//! store; `FakeEmbedder` produces deterministic character-histogram vectors
//! and records every prompt it receives.

use async_trait::async_trait;
use chrono::Utc;
use semsearch_core::{
    NewProduct, Product, ProductMetadata, ProductRepository, Result, SearchMatch, SemsearchError,
};
use semsearch_vector::{EmbeddingClient, VectorStore};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

const FAKE_DIMENSION: usize = 16;

#[derive(Default)]
struct CatalogState {
    products: Vec<Product>,
    embeddings: HashMap<i64, Vec<f32>>,
    embedding_writes: usize,
    failing_writes: HashSet<i64>,
    failing_reads: bool,
}

/// Product table and vector store kept in memory
#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    /// Catalog seeded with `(name, description)` rows, ids starting at 1
    pub fn with_products(rows: &[(&str, &str)]) -> Self {
        let catalog = Self::default();
        for (name, description) in rows {
            catalog.add_product(name, description);
        }
        catalog
    }

    /// Insert a row with `{ "source": "seed" }` metadata and return its id
    pub fn add_product(&self, name: &str, description: &str) -> i64 {
        let mut state = self.lock();
        let id = state.products.len() as i64 + 1;
        state.products.push(Product {
            id,
            product_name: name.to_string(),
            description: description.to_string(),
            metadata: serde_json::json!({ "source": "seed" }),
            created_at: Utc::now(),
        });
        id
    }

    pub fn set_metadata(&self, id: i64, metadata: serde_json::Value) {
        let mut state = self.lock();
        if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
            product.metadata = metadata;
        }
    }

    /// Make every write touching `id` fail
    pub fn fail_writes_for(&self, id: i64) {
        self.lock().failing_writes.insert(id);
    }

    /// Make every listing and ping fail
    pub fn fail_reads(&self) {
        self.lock().failing_reads = true;
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    pub fn embedding_of(&self, id: i64) -> Option<Vec<f32>> {
        self.lock().embeddings.get(&id).cloned()
    }

    /// Number of successful embedding writes
    pub fn embedding_writes(&self) -> usize {
        self.lock().embedding_writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn list_products(&self, only_missing_embedding: bool) -> Result<Vec<Product>> {
        let state = self.lock();
        if state.failing_reads {
            return Err(SemsearchError::DatabaseError(
                "Failed to list products: connection refused".to_string(),
            ));
        }

        Ok(state
            .products
            .iter()
            .filter(|p| !only_missing_embedding || !state.embeddings.contains_key(&p.id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        if self.lock().failing_reads {
            return Err(SemsearchError::DatabaseError(
                "PostgreSQL unreachable: connection refused".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let id = self.add_product(&product.product_name, &product.description);
        self.set_metadata(id, product.metadata().to_json());
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| SemsearchError::NotFound(format!("product {id}")))
    }

    async fn replace_metadata(
        &self,
        id: i64,
        metadata: &ProductMetadata,
    ) -> Result<Option<Product>> {
        let mut state = self.lock();
        if state.failing_writes.contains(&id) {
            return Err(SemsearchError::DatabaseError(format!(
                "Failed to update product {id}"
            )));
        }

        Ok(state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .map(|product| {
                product.metadata = metadata.to_json();
                product.clone()
            }))
    }
}

#[async_trait]
impl VectorStore for InMemoryCatalog {
    async fn store_embedding(&self, product_id: i64, embedding: &[f32]) -> Result<()> {
        let mut state = self.lock();
        if state.failing_writes.contains(&product_id) {
            return Err(SemsearchError::DatabaseError(format!(
                "Failed to store embedding for {product_id}"
            )));
        }
        if !state.products.iter().any(|p| p.id == product_id) {
            return Err(SemsearchError::NotFound(format!("product {product_id}")));
        }

        state.embeddings.insert(product_id, embedding.to_vec());
        state.embedding_writes += 1;
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchMatch>> {
        let state = self.lock();
        let mut matches: Vec<SearchMatch> = state
            .products
            .iter()
            .filter_map(|p| {
                let embedding = state.embeddings.get(&p.id)?;
                let similarity = cosine(query_vector, embedding)?;
                Some(SearchMatch {
                    id: p.id,
                    product_name: p.product_name.clone(),
                    description: p.description.clone(),
                    metadata: p.metadata.clone(),
                    similarity,
                })
            })
            .filter(|m| min_similarity.map_or(true, |t| m.similarity >= t))
            .collect();

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(limit);
        Ok(matches)
    }
}

/// Cosine similarity, `None` when either side has zero norm (pgvector yields NaN)
fn cosine(a: &[f32], b: &[f32]) -> Option<f32> {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        None
    } else {
        Some(dot / (norm_a * norm_b))
    }
}

/// Deterministic embedder recording its prompts
#[derive(Default)]
pub struct FakeEmbedder {
    failing_prompts: HashSet<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    /// Embedder that errors for exactly this prompt
    pub fn failing_on(prompt: &str) -> Self {
        Self {
            failing_prompts: HashSet::from([prompt.to_string()]),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EmbeddingClient for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.lock().push(text.to_string());

        if self.failing_prompts.contains(text) {
            return Err(SemsearchError::EmbeddingError(
                "Ollama embedding request failed: connection refused".to_string(),
            ));
        }

        let mut vector = vec![0.0; FAKE_DIMENSION];
        for c in text.chars().filter(|c| c.is_alphanumeric()) {
            let bucket = c.to_ascii_lowercase() as usize % FAKE_DIMENSION;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "fake-embed"
    }
}
