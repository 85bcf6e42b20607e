//! semsearch API Server
//!
//! Reads `SEMSEARCH_CONFIG` (a TOML file) when set, then applies
//! environment overrides.

use semsearch_api::telemetry::init_tracing;
use semsearch_core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("SEMSEARCH_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    semsearch_api::serve(config).await
}
