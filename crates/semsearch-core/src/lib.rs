//! semsearch Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout semsearch:
//! - Product records and their metadata shape
//! - Search results and embedding job reports
//! - Common error types
//! - Configuration management
//! - Product storage (PostgreSQL)

pub mod config;
pub mod products;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, EmbeddingConfig, LoggingConfig, SearchConfig,
    ServerConfig,
};
pub use products::{ProductRepository, ProductStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for semsearch operations
#[derive(Error, Debug)]
pub enum SemsearchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SemsearchError>;

// ============================================================================
// Product Models
// ============================================================================

/// A product row as stored in the `products` table.
///
/// The `embedding` column is not mapped here. It is written by the vector
/// store and only read through similarity queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Row identifier
    pub id: i64,

    /// Display name
    pub product_name: String,

    /// Free-text description
    pub description: String,

    /// Arbitrary JSON metadata (usually a copy of name and description)
    pub metadata: serde_json::Value,

    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Text sent to the embedding model for this product.
    ///
    /// Name and description joined by a single space; an empty description
    /// yields just the name.
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.product_name, &self.description)
    }
}

/// Build the embedding input for a name/description pair
pub fn embedding_text(name: &str, description: &str) -> String {
    let name = name.trim();
    let description = description.trim();
    if description.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        description.to_string()
    } else {
        format!("{name} {description}")
    }
}

/// Metadata object written by the backfill and by product ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub product_name: String,
    pub product_description: String,
}

impl ProductMetadata {
    /// Fresh metadata built from a product's own columns
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_name: product.product_name.clone(),
            product_description: product.description.clone(),
        }
    }

    /// Convert to the JSON stored in the `metadata` column
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "product_name": self.product_name,
            "product_description": self.product_description,
        })
    }
}

/// Input for creating a product row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    #[serde(default)]
    pub description: String,
}

impl NewProduct {
    pub fn new(product_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            description: description.into(),
        }
    }

    /// Metadata for the row about to be inserted
    pub fn metadata(&self) -> ProductMetadata {
        ProductMetadata {
            product_name: self.product_name.clone(),
            product_description: self.description.clone(),
        }
    }
}

// ============================================================================
// Search and Job Types
// ============================================================================

/// A product matched by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchMatch {
    pub id: i64,
    pub product_name: String,
    pub description: String,
    pub metadata: serde_json::Value,

    /// Cosine similarity to the query (higher is better)
    pub similarity: f32,
}

/// A product the embedding job could not process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingFailure {
    pub product_id: i64,
    pub error: String,
}

/// Outcome of one embedding job run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingReport {
    /// Rows fetched from the store
    pub scanned: usize,

    /// Rows whose embedding was written
    pub updated: usize,

    /// Rows that failed, in iteration order
    pub failures: Vec<EmbeddingFailure>,
}

impl EmbeddingReport {
    pub fn record_success(&mut self) {
        self.updated += 1;
    }

    pub fn record_failure(&mut self, product_id: i64, error: impl ToString) {
        self.failures.push(EmbeddingFailure {
            product_id,
            error: error.to_string(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
