//! # Inbound Ports
//!
//! The backend contract: what API-layer collaborators may ask of a network
//! backend. Both the in-memory simulation and the remote client implement it,
//! and callers hold it only as `Arc<dyn NetworkBackend>`.

use async_trait::async_trait;
use shared_types::{Address, Amount, BackendError, ContentId, JobId, JobStatus, Transaction, TxId};

/// Wallet half of the contract.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Issue a new payable address.
    async fn new_address(&self) -> Result<Address, BackendError>;

    /// Balance of `addr`; zero for addresses never seen.
    async fn balance(&self, addr: &Address) -> Result<Amount, BackendError>;

    /// Transfer `amount` from `from` to `to`.
    async fn send(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TxId, BackendError>;

    /// A page of `addr`'s history, oldest first.
    ///
    /// `limit < 0` means no limit; `offset < 0` is treated as zero.
    async fn transactions(
        &self,
        addr: &Address,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, BackendError>;
}

/// Content half of the contract.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Charge `payer` the storage fee, persist `data` and open a job.
    async fn store(&self, data: Vec<u8>, payer: &Address)
        -> Result<(JobId, ContentId), BackendError>;

    /// Current state of a job. Never blocks on job progress.
    async fn job_status(&self, job: &JobId) -> Result<JobStatus, BackendError>;

    /// Payload bytes stored under `id`.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, BackendError>;
}

/// Full backend contract.
pub trait NetworkBackend: WalletBackend + ContentBackend {}

impl<T: WalletBackend + ContentBackend + ?Sized> NetworkBackend for T {}

/// Backend-internal job processing, driven by the sealing worker.
///
/// Only backends that seal payloads themselves implement this; a remote
/// network advances its own jobs.
#[async_trait]
pub trait JobSealer: Send + Sync {
    /// Move every non-terminal job one step. Returns how many moved.
    async fn seal_pending(&self) -> usize;
}
