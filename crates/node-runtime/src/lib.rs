//! # Node Runtime Library
//!
//! Hosts the Filehive network backend inside a long-running process.
//!
//! ## Lifecycle
//!
//! 1. `NodeRuntime::new` validates configuration and builds the backend
//! 2. `NodeRuntime::start` spawns the sealing worker (simulation only)
//! 3. `NodeRuntime::shutdown` signals the worker and waits for it to exit
//!
//! API-layer collaborators obtain the backend through [`NodeRuntime::backend`].

#![warn(missing_docs)]

pub mod worker;

use anyhow::{Context, Result};
use fh_network_backend::{assemble, BackendConfig, JobSealer, NetworkBackend};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long `shutdown` waits for background tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running node.
pub struct NodeRuntime {
    config: BackendConfig,
    backend: Arc<dyn NetworkBackend>,
    sealer: Option<Arc<dyn JobSealer>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Validate `config` and build the backend it selects.
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate().context("invalid backend configuration")?;
        let assembled = assemble(&config).context("failed to build backend")?;
        let (shutdown_tx, _) = watch::channel(false);

        info!("[node] Backend {:?} assembled", config.kind);
        Ok(Self {
            config,
            backend: assembled.contract,
            sealer: assembled.sealer,
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn background work. Must be called inside a Tokio runtime.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Filehive Node Runtime v{}", fh_network_backend::VERSION);
        info!("  Backend: {:?}", self.config.kind);
        info!("===========================================");

        let Some(sealer) = self.sealer.clone() else {
            info!("[node] Remote backend seals jobs itself; no local worker");
            return;
        };
        let handle = tokio::spawn(worker::run_sealing_worker(
            sealer,
            self.config.sealing_interval,
            self.shutdown_tx.subscribe(),
        ));
        self.tasks.lock().push(handle);
    }

    /// Signal background tasks to stop and wait for them.
    pub async fn shutdown(&self) {
        info!("[node] Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("[node] Background task failed: {}", e),
                Err(_) => warn!("[node] Background task did not stop within {:?}", SHUTDOWN_GRACE),
            }
        }
        info!("[node] Shutdown complete");
    }

    /// The backend contract.
    pub fn backend(&self) -> Arc<dyn NetworkBackend> {
        Arc::clone(&self.backend)
    }

    /// Active configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}
