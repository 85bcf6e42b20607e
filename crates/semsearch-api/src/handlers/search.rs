//! Similarity search handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use semsearch_core::SearchMatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Search request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Free-text query
    #[schema(example = "warm light for a desk")]
    pub query: String,

    /// Maximum number of matches (capped by the server)
    #[serde(default)]
    #[schema(example = 5)]
    pub match_count: Option<usize>,

    /// Minimum cosine similarity
    #[serde(default)]
    #[schema(example = 0.78)]
    pub match_threshold: Option<f32>,
}

/// A matched product
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchMatchResponse {
    #[schema(example = 42)]
    pub id: i64,

    #[schema(example = "Desk Lamp")]
    pub product_name: String,

    #[schema(example = "Warm LED light with a brass arm")]
    pub description: String,

    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,

    /// Cosine similarity to the query
    #[schema(example = 0.83)]
    pub similarity: f32,
}

impl From<SearchMatch> for SearchMatchResponse {
    fn from(m: SearchMatch) -> Self {
        Self {
            id: m.id,
            product_name: m.product_name,
            description: m.description,
            metadata: m.metadata,
            similarity: m.similarity,
        }
    }
}

/// Embed the query and return the nearest products
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matches, best first", body = [SearchMatchResponse]),
        (status = 400, description = "Empty query or malformed body", body = crate::error::ApiError),
        (status = 500, description = "Embedding or store failure", body = crate::error::ApiError)
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let Json(req) = payload?;
    tracing::debug!(query = %req.query, "Received search query");

    let matches = state
        .similarity_search()
        .search(&req.query, req.match_count, req.match_threshold)
        .await?;

    let body: Vec<SearchMatchResponse> = matches.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
