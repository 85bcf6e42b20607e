//! semsearch API - REST server
//!
//! HTTP endpoints for embedding generation, similarity search and
//! product maintenance.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use handlers::{embeddings, health, products, search};
use semsearch_core::config::{AppConfig, ServerConfig};
use semsearch_pipeline::Backends;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "semsearch API",
        description = "Embedding generation and similarity search over products"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        health::metrics,
        embeddings::generate_embeddings,
        search::search_handler,
        products::create_product,
        products::backfill_metadata,
    ),
    components(schemas(
        error::ApiError,
        health::HealthResponse,
        health::ReadinessResponse,
        health::MetricsResponse,
        embeddings::GenerateRequest,
        embeddings::GenerateResponse,
        embeddings::FailureResponse,
        search::SearchRequest,
        search::SearchMatchResponse,
        products::CreateProductRequest,
        products::ProductResponse,
    )),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "embeddings", description = "Embedding generation"),
        (name = "search", description = "Similarity search"),
        (name = "products", description = "Product ingestion and maintenance")
    )
)]
pub struct ApiDoc;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server);

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/v1", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

/// Router over empty in-memory backends
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    use semsearch_pipeline::testing::{FakeEmbedder, InMemoryCatalog};

    let state = AppState::for_testing(
        AppConfig::default(),
        Arc::new(InMemoryCatalog::default()),
        Arc::new(FakeEmbedder::default()),
    );
    create_router(Arc::new(state))
}

fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    if !config.cors_enabled {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

/// Connect the backends and serve until the process is stopped
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let backends = Backends::connect(&config).await?;
    let state = Arc::new(AppState::new(config, backends));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("semsearch API starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
