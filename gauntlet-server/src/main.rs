//! Gauntlet Server - five judges, one idea

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gauntlet_server::{config::Args, server, ServerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("gauntlet_server={0},gauntlet_judge={0},info", log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        return Err(ServerError::Config(e).into());
    }

    let judge = args.judge_service().map_err(ServerError::from)?;

    info!("======================================");
    info!("  Idea Gauntlet - Judging Endpoint");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Provider: {}", args.provider);
    info!("Model: {}", args.model);
    if let Some(ref url) = args.model_base_url {
        info!("Model base URL: {}", url);
    }
    info!("Credential: {}", if judge.is_configured() { "set" } else { "MISSING" });
    info!("Judge timeout: {}ms", args.judge_timeout_ms);
    info!("Max body: {} bytes", args.max_body_bytes);
    info!("======================================");

    let state = Arc::new(server::AppState::new(args, judge));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }

    Ok(())
}
