//! Product handlers: ingestion and metadata backfill

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use semsearch_core::{NewProduct, Product};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Product row as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    #[schema(example = 42)]
    pub id: i64,

    #[schema(example = "Desk Lamp")]
    pub product_name: String,

    #[schema(example = "Warm LED light with a brass arm")]
    pub description: String,

    /// Metadata object stored with the row
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            product_name: product.product_name,
            description: product.description,
            metadata: product.metadata,
            created_at: product.created_at,
        }
    }
}

/// Create product request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Desk Lamp")]
    pub product_name: String,

    #[serde(default)]
    #[schema(example = "Warm LED light with a brass arm")]
    pub description: String,
}

/// Insert a product and embed its description
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 500, description = "Internal error", body = crate::error::ApiError)
    )
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let Json(req) = payload?;

    let product = state
        .product_ingest()
        .add(NewProduct::new(req.product_name, req.description))
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Rewrite every product's metadata from its name and description
#[utoipa::path(
    post,
    path = "/api/v1/metadata/backfill",
    tag = "products",
    responses(
        (status = 200, description = "Rows that were updated", body = [ProductResponse]),
        (status = 500, description = "Products could not be fetched", body = crate::error::ApiError)
    )
)]
pub async fn backfill_metadata(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let updated = state.metadata_backfill().run().await?;
    let body: Vec<ProductResponse> = updated.into_iter().map(ProductResponse::from).collect();

    Ok(Json(body))
}
