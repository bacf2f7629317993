use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use taleweaver_server::{
    AppState, ObservabilityConfig, TaleweaverConfig, create_router, init_observability,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Taleweaver story server", long_about = None)]
struct Args {
    /// Configuration file replacing ./taleweaver.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides [server] bind)
    #[arg(short, long)]
    bind: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = TaleweaverConfig::load(args.config.as_deref())?;

    init_observability(&ObservabilityConfig {
        log_level: config.server.log_level.clone(),
        json_logs: args.json_logs || config.server.json_logs,
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let state = AppState::from_config(&config)?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind).await?;

    info!(
        bind = %bind,
        model = %config.completion.model,
        storage = ?config.storage.backend,
        "Starting Taleweaver server"
    );

    axum::serve(listener, create_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    info!("Taleweaver server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
