//! Demo GeoPose protocol server answering with a configured pose

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use geopose::transport::{router, EndpointState};
use geopose::utils::ServerConfig;

/// Serve the GeoPose protocol endpoint with a fixed pose from a config file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the server configuration JSON file.
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("loading configuration from {}", cli.config.display());
    let config = ServerConfig::from_file(&cli.config)?;

    let state = EndpointState::from_config(&config);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("serving /geopose on {}", config.bind);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
