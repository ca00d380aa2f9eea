mod collection;
mod config;
mod errors;
mod models;
mod ranking;
mod requirements;
mod routes;
mod segmentation;
mod state;
mod text;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::collection::batch::{run_batch, JsonFileSink};
use crate::collection::CollectionRunner;
use crate::config::Config;
use crate::routes::build_router;
use crate::segmentation::DocumentTextExtractor;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "digest", version, about = "Persona-driven section ranking for document collections")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Rank every collection under a directory and write challenge1b_output.json files
    Batch {
        /// Directory whose sub-directories are collections
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting digest v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Pipeline: top_k={}, weights={:?}, parse timeout {:?}",
        config.pipeline.top_k, config.pipeline.weights, config.pipeline.parse_timeout
    );

    let runner = CollectionRunner::new(Arc::new(DocumentTextExtractor), config.pipeline.clone());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, runner).await,
        Command::Batch { input } => {
            let summary = run_batch(&input, &runner, Arc::new(JsonFileSink)).await?;
            if summary.processed == 0 && summary.failed > 0 {
                bail!("All {} collections failed", summary.failed);
            }
            Ok(())
        }
    }
}

async fn serve(config: Config, runner: CollectionRunner) -> Result<()> {
    let port = config.port;
    let state = AppState::new(config, runner);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
