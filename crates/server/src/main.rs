mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use referent_core::{FetchConfig, ProviderConfig, Referent};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::{AppState, app};

const DEFAULT_FILTER: &str = "referent_server=info,referent_core=info,tower_http=info";

/// HTTP API for article extraction and AI processing
#[derive(Parser, Debug)]
#[command(name = "referent-server")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "REFERENT_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Timeout for fetching article pages, in seconds
    #[arg(long, env = "REFERENT_FETCH_TIMEOUT", default_value = "30")]
    fetch_timeout: u64,

    /// Upper bound for a whole request, in seconds
    #[arg(long, env = "REFERENT_REQUEST_TIMEOUT", default_value = "300")]
    request_timeout: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let providers = ProviderConfig::from_env();
    if providers.chat_api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; AI endpoints will fail");
    }
    if providers.image_api_key.is_none() {
        warn!("HUGGING_FACE_API_KEY is not set; /api/illustrate will fail");
    }

    let fetch = FetchConfig { timeout: args.fetch_timeout, ..Default::default() };
    let state = AppState { referent: Arc::new(Referent::new(providers).with_fetch_config(fetch)) };
    let router = app(state, Duration::from_secs(args.request_timeout));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
