//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use semsearch_core::SemsearchError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Embedding(String),
    Internal(String),
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Embedding(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("EMBEDDING_ERROR", "Embedding request failed").with_details(msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error().with_details(msg),
            ),
            AppError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("DATABASE_ERROR", "Database operation failed").with_details(msg),
            ),
        };

        tracing::debug!(status = %status, code = %error.code, "request failed");
        (status, Json(error)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<SemsearchError> for AppError {
    fn from(err: SemsearchError) -> Self {
        match err {
            SemsearchError::NotFound(msg) => AppError::NotFound(msg),
            SemsearchError::ValidationError(msg) => AppError::BadRequest(msg),
            SemsearchError::DatabaseError(msg) => AppError::Database(msg),
            SemsearchError::EmbeddingError(msg) => AppError::Embedding(msg),
            SemsearchError::SearchError(msg) => AppError::Internal(format!("Search error: {msg}")),
            SemsearchError::ConfigError(msg) => {
                AppError::Internal(format!("Configuration error: {msg}"))
            }
            SemsearchError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response =
            AppError::from(SemsearchError::ValidationError("empty".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_failures_map_to_500() {
        for err in [
            SemsearchError::EmbeddingError("timeout".to_string()),
            SemsearchError::DatabaseError("gone".to_string()),
            SemsearchError::SearchError("bad vector".to_string()),
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_json_rejection_maps_to_bad_request() {
        let rejection = axum::Json::<serde_json::Value>::from_bytes(b"{not json").unwrap_err();
        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_envelope_shape() {
        let json =
            serde_json::to_value(ApiError::internal_error().with_details("boom")).unwrap();
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["details"], "boom");
        assert!(json.get("stack").is_none());
    }
}
