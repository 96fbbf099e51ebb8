//! Raise3D bridge daemon entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raise3d_config::Storage;
use raise3d_server::api::router;
use raise3d_server::{Bridge, BridgeSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let settings_path = std::env::var("RAISE3D_BRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("bridge.yaml"));
    let settings = BridgeSettings::load(&settings_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Raise3D bridge");

    let storage = Arc::new(Storage::new(&settings.config_dir));
    let bridge = Bridge::new(storage);

    bridge.entries.load().await?;
    bridge.setup_all().await;

    let listener = tokio::net::TcpListener::bind(&settings.listen).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "REST API listening");

    axum::serve(listener, router(bridge.clone()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down");
    bridge.shutdown().await;

    Ok(())
}
