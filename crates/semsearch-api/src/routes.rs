//! API route definitions

use crate::handlers::{embeddings, products, search};
use crate::state::AppState;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/embeddings/generate", post(embeddings::generate_embeddings))
        .route("/search", post(search::search_handler))
        .route("/products", post(products::create_product))
        // GET kept for clients of the original backfill route
        .route(
            "/metadata/backfill",
            post(products::backfill_metadata).get(products::backfill_metadata),
        )
}
