//! semsearch CLI - Command-line interface
//!
//! Usage:
//!   semsearch serve
//!   semsearch embed [--only-missing]
//!   semsearch search <query> [--limit N] [--threshold T]
//!   semsearch backfill-metadata
//!   semsearch add <name> [--description D]

use anyhow::Context;
use clap::{Parser, Subcommand};
use semsearch_api::telemetry::init_tracing;
use semsearch_core::{AppConfig, NewProduct};
use semsearch_pipeline::Backends;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "semsearch")]
#[command(about = "Product embeddings and similarity search")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables override it)
    #[arg(short, long, env = "SEMSEARCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Generate embeddings for stored products
    Embed {
        /// Skip products that already have an embedding
        #[arg(long)]
        only_missing: bool,
    },
    /// Search products similar to a query
    Search {
        /// Free-text query
        query: String,
        /// Maximum number of matches
        #[arg(short, long)]
        limit: Option<usize>,
        /// Minimum cosine similarity
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Rewrite product metadata from name and description
    BackfillMetadata,
    /// Add a product and embed it
    Add {
        /// Product name
        name: String,
        /// Product description
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve => semsearch_api::serve(config).await?,
        Commands::Embed { only_missing } => {
            let backends = Backends::connect(&config).await?;
            let report = backends.embedding_job().run(only_missing).await?;
            print_json(&report)?;
            if report.failed() > 0 {
                tracing::warn!(failed = report.failed(), "Some products were not embedded");
            }
        }
        Commands::Search {
            query,
            limit,
            threshold,
        } => {
            let backends = Backends::connect(&config).await?;
            let matches = backends
                .similarity_search(config.search.clone())
                .search(&query, limit, threshold)
                .await?;
            print_json(&matches)?;
        }
        Commands::BackfillMetadata => {
            let backends = Backends::connect(&config).await?;
            let updated = backends.metadata_backfill().run().await?;
            print_json(&updated)?;
        }
        Commands::Add { name, description } => {
            let backends = Backends::connect(&config).await?;
            let product = backends
                .product_ingest()
                .add(NewProduct::new(name, description))
                .await?;
            print_json(&product)?;
        }
    }

    Ok(())
}
