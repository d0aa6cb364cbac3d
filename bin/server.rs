// Parcel Subdivision - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use parcel_subdivision::api::{router, AppState};
use parcel_subdivision::{logging, Config};
use std::sync::Arc;
use tracing::info;

/// Parcel subdivision JSON API server
#[derive(Parser, Debug)]
#[command(name = "subdivision-server", version, about)]
struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let (config, load_error) = Config::load_or_default(&config_path);
    logging::init(&config.logging);
    Config::warn_on_fallback(load_error.as_ref());

    let state = AppState {
        default_file_stem: Arc::from(config.document.default_file_stem.as_str()),
    };
    let app = router(state);

    let addr = config.server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, config = %config_path, "subdivision server listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
