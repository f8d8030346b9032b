//! Server binary: env-driven configuration, logging init, serve.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use docpress::inspect::{InspectClient, InspectConfig};
use docpress::pipeline::Pipeline;
use docpress::server::{init_logging, serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let inspect_config = InspectConfig::from_env().context("remote service configuration")?;

    let addr: SocketAddr = std::env::var("DOCPRESS_LISTEN")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .context("invalid DOCPRESS_LISTEN address")?;

    let state = AppState {
        pipeline: Arc::new(Pipeline::default()),
        inspect: Arc::new(InspectClient::new(inspect_config)),
    };

    serve(addr, state).await
}
