mod cli;
mod config;
mod conversation;
mod error;
mod logging;
mod prompt;
mod report;
mod routes;

use crate::cli::Args;
use crate::config::{load_server_config, resolve_inference_config};
use crate::conversation::ConversationManager;
use crate::logging::init_tracing;
use crate::routes::{build_router, AppState};
use anyhow::Context;
use clap::Parser;
use inference::OpenAiClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_dir.as_deref(), args.log_to_stderr)?;

    let config = load_server_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let listen_addr = args
        .listen_addr
        .clone()
        .unwrap_or_else(|| config.listen_addr.clone());
    let inference = resolve_inference_config(&config.inference, |key| std::env::var(key).ok())?;
    let client = OpenAiClient::new(inference).context("failed to build inference client")?;
    info!(
        listen_addr = %listen_addr,
        config = %args.config.display(),
        inference_url = %client.url(),
        model = %client.config().model,
        timeout_ms = client.config().timeout_ms,
        max_upload_bytes = config.max_upload_bytes,
        "zapchat starting"
    );

    let conversations = Arc::new(ConversationManager::new(Arc::new(client)));
    let app = build_router(AppState::new(conversations, config.max_upload_bytes));

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(addr = %listen_addr, "zapchat listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("zapchat shutting down");
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
