#![cfg(not(tarpaulin_include))]

use csv_insight::app;
use csv_insight::config::ServerConfig;

/// Main entry point for the web application
///
/// Initializes logging, resolves the server settings and runs the upload
/// server until it is stopped.
///
/// # Arguments
/// * `[host] [port]` - optional positional overrides of the bind address
///
/// # Environment
/// * `RUST_LOG` - log filter, `info` when unset
/// * `CSV_INSIGHT_HOST`, `CSV_INSIGHT_PORT`, `CSV_INSIGHT_MAX_UPLOAD_MB`
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    log::info!(
        "starting CSV insight server (max upload {} bytes)",
        config.max_upload_bytes
    );

    app::run(config).await
}
