//! docflow Portal
//!
//! Serves the document form and the settings editor.

use anyhow::Context;
use clap::Parser;
use docflow_forms::WebhookClient;
use docflow_portal::{build_router, AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docflow-portal")]
#[command(about = "Document form portal with webhook submission", version)]
struct Args {
    /// Configuration resource read at startup and on reload
    #[arg(short, long, env = "DOCFLOW_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Listen address
    #[arg(short, long, env = "DOCFLOW_BIND", default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let client = WebhookClient::new().context("failed to build webhook client")?;
    let state = AppState::load(&args.config, client).context("failed to register page templates")?;
    let app = build_router(state);

    tracing::info!("Portal listening on {}", args.bind);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(listener, app).await?;
    Ok(())
}
