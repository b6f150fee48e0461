use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taleweaver_rate_limit::TaleweaverConfig;
use taleweaver_server::{AppState, init_tracing, router};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Taleweaver storybook server", long_about = None)]
struct Args {
    /// Configuration file, layered over the bundled defaults
    #[arg(short, long, env = "TALEWEAVER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = TaleweaverConfig::load_with(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.server)?;
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let state = AppState::from_config(&config)?;
    let runner = state.pipeline().runner().clone();

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(
        address = %address,
        public_url = %config.server.public_base_url,
        storage = %config.storage.root.display(),
        "Taleweaver server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let pending = runner.active().await;
    if !pending.is_empty() {
        warn!(builds = pending.len(), "Waiting for running builds");
    }
    runner.join_all().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
