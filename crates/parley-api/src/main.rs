//! Parley server entry point.
//!
//! Binary name: `parleyd`
//!
//! Loads configuration from the environment, initializes the database and
//! services, and serves the HTTP API.

mod http;
mod state;

use clap::Parser;

use parley_infra::config::AppConfig;
use state::AppState;

#[derive(Parser)]
#[command(name = "parleyd", about = "Parley conversation backend", version)]
struct Args {
    /// Address to bind, e.g. 0.0.0.0:8080 (overrides PARLEY_BIND_ADDR).
    #[arg(long)]
    bind: Option<String>,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    parley_observe::tracing_setup::init_tracing(args.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = AppConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let bind_addr = config.bind_addr.clone();

    let state = AppState::init(config).await?;
    let router = http::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "parleyd listening");
    axum::serve(listener, router).await?;

    parley_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
