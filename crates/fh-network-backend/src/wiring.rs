//! # Backend Wiring
//!
//! Builds the configured backend variant and hands it out behind the
//! contract trait.

use crate::adapters::{HttpJsonRpcTransport, InMemorySimulation, RemoteClient};
use crate::config::{BackendConfig, BackendKind};
use crate::ports::inbound::{JobSealer, NetworkBackend};
use shared_types::BackendError;
use std::sync::Arc;
use tracing::info;

/// A built backend.
pub struct AssembledBackend {
    /// The contract handed to API-layer collaborators.
    pub contract: Arc<dyn NetworkBackend>,
    /// Job processing the runtime must drive, if the backend seals locally.
    pub sealer: Option<Arc<dyn JobSealer>>,
}

/// Build the configured backend.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn NetworkBackend>, BackendError> {
    assemble(config).map(|backend| backend.contract)
}

/// Build the configured backend together with its job sealer.
pub fn assemble(config: &BackendConfig) -> Result<AssembledBackend, BackendError> {
    match config.kind {
        BackendKind::Simulation => {
            let simulation = Arc::new(build_simulation(config)?);
            info!(
                "[fh-backend] Simulation backend ready (payloads: {})",
                config
                    .data_dir
                    .as_ref()
                    .map_or_else(|| "memory".to_string(), |d| d.display().to_string())
            );
            Ok(AssembledBackend {
                contract: simulation.clone(),
                sealer: Some(simulation),
            })
        }
        BackendKind::Remote => {
            let endpoint = config.remote.endpoint.clone().ok_or_else(|| {
                BackendError::Transport("no remote endpoint configured".to_string())
            })?;
            let transport = HttpJsonRpcTransport::new(
                endpoint.clone(),
                config.remote.auth_token.clone(),
                config.remote.retry.call_timeout,
            )?;
            info!("[fh-backend] Remote backend at {}", endpoint);
            Ok(AssembledBackend {
                contract: Arc::new(RemoteClient::new(transport, config.remote.retry)),
                sealer: None,
            })
        }
    }
}

/// Build a simulation from `config`, minting its genesis balances.
pub fn build_simulation(config: &BackendConfig) -> Result<InMemorySimulation, BackendError> {
    let mut simulation = match &config.data_dir {
        Some(dir) => InMemorySimulation::with_data_dir(dir)?,
        None => InMemorySimulation::in_memory()?,
    };
    let collector = match &config.fee_collector {
        Some(addr) => addr.clone(),
        None => simulation.fee_collector().clone(),
    };
    simulation = simulation.with_fees(config.fees, collector);

    for (addr, amount) in &config.genesis {
        simulation.generate_to_address(addr, *amount)?;
        info!("[fh-backend] Genesis: {} {}", addr, amount.to_major_string());
    }
    Ok(simulation)
}
