//! API handlers

pub mod embeddings;
pub mod health;
pub mod products;
pub mod search;
