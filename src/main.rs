use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use market_gateway::config::Args;
use market_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let state = Arc::new(AppState::new(&args));
    let app = market_gateway::build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        port = args.port,
        upstream = %args.upstream_base,
        has_auth = args.api_key.is_some(),
        "gateway listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
