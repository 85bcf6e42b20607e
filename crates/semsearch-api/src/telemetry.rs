//! Tracing subscriber setup shared by the server and the CLI

use semsearch_core::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{level},semsearch_api=debug,semsearch_pipeline={level},tower_http=debug"
    ))
}
