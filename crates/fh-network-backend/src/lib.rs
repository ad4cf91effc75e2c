//! # Filehive Network Backend
//!
//! The capability a marketplace needs from a payment/storage network: a
//! wallet ledger and a content store, behind one contract.
//!
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Variants
//!
//! | Variant | Use |
//! |---------|-----|
//! | `InMemorySimulation` | Development and tests; optional file-backed payloads |
//! | `RemoteClient` | A real node over JSON-RPC, with deadlines and retries |
//!
//! Callers depend only on [`NetworkBackend`] and never learn which variant
//! they hold.
//!
//! ## Guarantees
//!
//! | Rule | Where |
//! |------|-------|
//! | No overdraft | balance check and append under one write lock |
//! | Self-transfer is one entry, balance unchanged | `LedgerState::transfer` |
//! | Pagination never fails, never mutates | `Page::range` |
//! | Overrides consumed exactly once | `PendingOverrides` under the same lock |
//! | No payload I/O under the ledger lock | `InMemorySimulation::store` |
//!
//! ## Module Structure
//!
//! ```text
//! fh-network-backend/
//! ├── domain/     # ledger, pagination, overrides, fees, jobs, invariants
//! ├── ports/      # NetworkBackend (inbound); BlobStore, ChainTransport, ... (outbound)
//! ├── adapters/   # simulation, remote client, blob stores, clock, identities
//! ├── config.rs   # BackendConfig, env overrides, validation
//! └── wiring.rs   # build_backend
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod wiring;

// Re-exports
pub use adapters::{
    FileBlobStore, HttpJsonRpcTransport, InMemoryBlobStore, InMemorySimulation, RemoteClient,
    RetryPolicy, Secp256k1IdentityGenerator, SystemTimeSource,
};
pub use config::{BackendConfig, BackendKind, ConfigError, RemoteConfig};
pub use domain::{FeeSchedule, JobRecord, Page};
pub use ports::{
    BlobStore, ChainTransport, ContentBackend, IdentityGenerator, JobSealer, NetworkBackend,
    TimeSource, WalletBackend,
};
pub use wiring::{assemble, build_backend, build_simulation, AssembledBackend};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
