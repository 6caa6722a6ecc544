//! Inkwell server binary.

use anyhow::{bail, Result};
use inkwell_common_log::LogConfig;
use inkwell_server::config::{load_config, validate_config};
use inkwell_server::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config()?;

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("config error: {error}");
        }
        bail!("Invalid configuration ({} problems)", errors.len());
    }

    inkwell_common_log::init(
        LogConfig::from_env().with_settings(&config.logging.level, &config.logging.format),
    )?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Inkwell server");

    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
