//! Approval Sink - local stand-in for the automation webhook.
//!
//! Accepts `POST /webhook`, checks the routing fields of the action payload
//! and echoes them back. Point `WEBHOOK_ENDPOINT` at it for local runs.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use approval::web::sink_router;
use approval::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let config = Config::from_env();
    let addr = SocketAddr::from(([127, 0, 0, 1], config.sink_port));

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "sink_listening");

    axum::serve(listener, sink_router())
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Server error")?;

    info!("sink_shutdown_complete");

    Ok(())
}
