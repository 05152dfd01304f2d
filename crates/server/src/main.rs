//! Ames price prediction service entrypoint
//!
//! Loads the trained artifact before binding the listener; a missing or
//! corrupt artifact is fatal so the service never runs half-initialized.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use ames_model::Artifact;
use ames_server::{start_server, AppState};

#[derive(Parser, Debug)]
#[command(name = "ames-serve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP prediction service for the Ames price model", long_about = None)]
struct Args {
    /// Path to the trained artifact
    #[arg(short, long, default_value = "models/ames/artifact.json")]
    artifact: PathBuf,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let artifact = Artifact::load(&args.artifact)
        .with_context(|| format!("failed to load artifact from {}", args.artifact.display()))?;

    tracing::info!(
        "Loaded artifact: {} trees, {} neighborhoods (hash {})",
        artifact.model.num_trees(),
        artifact.neighborhoods.len(),
        artifact.hash_hex().unwrap_or_else(|_| "unavailable".to_string()),
    );

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Prediction service listening on {addr}");

    start_server(AppState::new(artifact), &addr).await
}
