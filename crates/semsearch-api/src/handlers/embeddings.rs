//! Embedding generation handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use semsearch_core::{EmbeddingFailure, EmbeddingReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Generate request body (optional)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Only embed products that have no embedding yet
    #[serde(default)]
    #[schema(default = false)]
    pub only_missing: bool,
}

/// A product that could not be embedded
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureResponse {
    #[schema(example = 7)]
    pub product_id: i64,
    #[schema(example = "Ollama embedding request failed: connection refused")]
    pub error: String,
}

/// Embedding job summary
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    /// Rows fetched from the store
    pub scanned: usize,
    /// Rows whose embedding was written
    pub updated: usize,
    /// Rows that failed
    pub failed: usize,
    pub failures: Vec<FailureResponse>,
}

impl From<EmbeddingReport> for GenerateResponse {
    fn from(report: EmbeddingReport) -> Self {
        Self {
            scanned: report.scanned,
            updated: report.updated,
            failed: report.failed(),
            failures: report
                .failures
                .into_iter()
                .map(|EmbeddingFailure { product_id, error }| FailureResponse { product_id, error })
                .collect(),
        }
    }
}

/// Embed every product and store the vectors
#[utoipa::path(
    post,
    path = "/api/v1/embeddings/generate",
    tag = "embeddings",
    request_body(content = GenerateRequest, description = "Optional job options"),
    responses(
        (status = 200, description = "Job finished", body = GenerateResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ApiError),
        (status = 500, description = "Products could not be fetched", body = crate::error::ApiError)
    )
)]
pub async fn generate_embeddings(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let req = parse_generate_request(&body)?;
    let report = state.embedding_job().run(req.only_missing).await?;

    Ok(Json(GenerateResponse::from(report)))
}

/// An empty body means default options; anything else must be valid JSON
fn parse_generate_request(body: &[u8]) -> Result<GenerateRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }

    let Json(req) = Json::<GenerateRequest>::from_bytes(body)?;
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        assert!(!parse_generate_request(b"").unwrap().only_missing);
        assert!(!parse_generate_request(b" \n").unwrap().only_missing);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let req = parse_generate_request(br#"{"name":"x","only_missing":true}"#).unwrap();
        assert!(req.only_missing);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = parse_generate_request(br#"{"only_missing":"true"}"#).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
