//! # Filehive Node Runtime
//!
//! Entry point for the Filehive network backend.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, else `FH_LOG`, else `info`)
//! 2. Load configuration from `FH_*` environment variables
//! 3. Build the backend and spawn the sealing worker
//! 4. Run until Ctrl+C, then shut down gracefully

use anyhow::Result;
use fh_network_backend::BackendConfig;
use node_runtime::NodeRuntime;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let config = BackendConfig::from_env();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = NodeRuntime::new(config)?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
