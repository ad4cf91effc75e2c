//! In-Memory Simulation Adapter
//!
//! Implements the full backend contract against in-process state, standing
//! in for the storage network in development and tests.
//!
//! ## Locking
//!
//! One `RwLock` guards the ledger, the pending overrides and the job
//! registry. Every mutation (send, mint, fee debit, refund, override setters,
//! job registration and advancement) takes it exclusively; balance and
//! history reads take it shared. Payload I/O and hashing in `store` happen
//! with the lock released.

use crate::adapters::blob_store::{FileBlobStore, InMemoryBlobStore};
use crate::adapters::identity::Secp256k1IdentityGenerator;
use crate::adapters::time::SystemTimeSource;
use crate::domain::{
    FeeSchedule, JobRecord, JobRegistry, LedgerState, Page, PendingOverrides, Stamp,
};
use crate::ports::inbound::{ContentBackend, JobSealer, WalletBackend};
use crate::ports::outbound::{BlobStore, IdentityGenerator, TimeSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{
    Address, Amount, BackendError, ContentId, JobId, JobStatus, NotFoundKind, Transaction, TxId,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default fee collector of a fresh simulation.
pub const DEFAULT_FEE_COLLECTOR: &str = "f099";

/// Everything guarded by the backend lock.
#[derive(Debug, Default)]
struct SimState {
    ledger: LedgerState,
    overrides: PendingOverrides,
    jobs: JobRegistry,
}

/// How `stamp` should pick the id and time of a new ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StampSource {
    /// User-visible call: pending overrides win.
    Overridable,
    /// Fee debit or refund: always fresh.
    Fresh,
}

fn random_txid() -> TxId {
    TxId::from_bytes(rand::random())
}

/// In-process network backend.
pub struct InMemorySimulation {
    state: RwLock<SimState>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn TimeSource>,
    identities: Arc<dyn IdentityGenerator>,
    fees: FeeSchedule,
    fee_collector: Address,
}

impl InMemorySimulation {
    /// Create a simulation over the given collaborators.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn TimeSource>,
        identities: Arc<dyn IdentityGenerator>,
    ) -> Result<Self, BackendError> {
        let fee_collector = Address::parse(DEFAULT_FEE_COLLECTOR)?;
        Ok(Self {
            state: RwLock::new(SimState::default()),
            blobs,
            clock,
            identities,
            fees: FeeSchedule::free(),
            fee_collector,
        })
    }

    /// Simulation with in-memory payloads, the system clock, fresh secp256k1
    /// addresses and no storage fees.
    pub fn in_memory() -> Result<Self, BackendError> {
        Self::new(
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(SystemTimeSource),
            Arc::new(Secp256k1IdentityGenerator),
        )
    }

    /// Simulation storing payloads under `data_dir`.
    ///
    /// Fails with `Storage` when the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        Self::new(
            Arc::new(FileBlobStore::open(data_dir)?),
            Arc::new(SystemTimeSource),
            Arc::new(Secp256k1IdentityGenerator),
        )
    }

    /// Charge `fees` on every `store`, crediting `collector`.
    pub fn with_fees(mut self, fees: FeeSchedule, collector: Address) -> Self {
        self.fees = fees;
        self.fee_collector = collector;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the identity generator.
    pub fn with_identity_generator(mut self, identities: Arc<dyn IdentityGenerator>) -> Self {
        self.identities = identities;
        self
    }

    /// Active fee schedule.
    pub fn fee_schedule(&self) -> FeeSchedule {
        self.fees
    }

    /// Address credited with storage fees.
    pub fn fee_collector(&self) -> &Address {
        &self.fee_collector
    }

    // -------------------------------------------------------------------------
    // Test hooks
    // -------------------------------------------------------------------------

    /// Make the next `new_address` return `addr`.
    pub fn set_next_address(&self, addr: Address) {
        self.state.write().overrides.set_address(addr);
    }

    /// Make the next `send` or mint use `id`.
    pub fn set_next_txid(&self, id: TxId) {
        self.state.write().overrides.set_txid(id);
    }

    /// Make the next `send` or mint use `at` as its timestamp.
    pub fn set_next_time(&self, at: DateTime<Utc>) {
        self.state.write().overrides.set_time(at);
    }

    // -------------------------------------------------------------------------
    // Ledger
    // -------------------------------------------------------------------------

    /// Administrative credit to `addr`.
    pub fn generate_to_address(&self, addr: &Address, amount: Amount) -> Result<TxId, BackendError> {
        let mut guard = self.state.write();
        let SimState {
            ledger, overrides, ..
        } = &mut *guard;

        let tx = ledger.mint(addr, amount, || {
            Self::stamp(overrides, self.clock.as_ref(), StampSource::Overridable)
        })?;
        debug!("[fh-backend] Minted {} to {} ({})", amount, addr, tx.id);
        Ok(tx.id)
    }

    /// Balance of `addr` under a shared lock.
    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.state.read().ledger.balance(addr)
    }

    /// A page of `addr`'s history.
    pub fn history(&self, addr: &Address, page: Page) -> Vec<Transaction> {
        self.state.read().ledger.page(addr, page)
    }

    fn stamp(overrides: &mut PendingOverrides, clock: &dyn TimeSource, source: StampSource) -> Stamp {
        match source {
            StampSource::Overridable => Stamp {
                id: overrides.take_txid().unwrap_or_else(random_txid),
                timestamp: overrides.take_time().unwrap_or_else(|| clock.now()),
            },
            StampSource::Fresh => Stamp {
                id: random_txid(),
                timestamp: clock.now(),
            },
        }
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
        source: StampSource,
    ) -> Result<Transaction, BackendError> {
        let mut guard = self.state.write();
        let SimState {
            ledger, overrides, ..
        } = &mut *guard;

        ledger.transfer(from, to, amount, || {
            Self::stamp(overrides, self.clock.as_ref(), source)
        })
    }

    // -------------------------------------------------------------------------
    // Jobs
    // -------------------------------------------------------------------------

    /// Jobs paid for by `payer`, in submission order.
    pub fn jobs_for(&self, payer: &Address) -> Vec<JobRecord> {
        self.state.read().jobs.for_payer(payer)
    }

    /// Full record of a job.
    pub fn job(&self, id: &JobId) -> Option<JobRecord> {
        self.state.read().jobs.get(id).cloned()
    }

    /// Move every non-terminal job one step along its lifecycle.
    ///
    /// `Submitted` jobs start sealing. `Sealing` jobs become `Active` when
    /// their payload is present and still hashes to its content id, `Failed`
    /// otherwise. Jobs whose payload cannot be read right now are left for
    /// the next round. Returns the transitions applied.
    pub async fn advance_jobs(&self) -> Vec<(JobId, JobStatus)> {
        let pending = self.state.read().jobs.pending();

        let mut decided = Vec::with_capacity(pending.len());
        for job in pending {
            let next = match job.status {
                JobStatus::Submitted => JobStatus::Sealing,
                JobStatus::Sealing => match self.blobs.get(&job.content_id).await {
                    Ok(Some(bytes)) if job.content_id.matches(&bytes) => JobStatus::Active,
                    Ok(_) => JobStatus::Failed,
                    Err(e) => {
                        warn!("[fh-backend] Job {} payload unreadable: {}", job.id, e);
                        continue;
                    }
                },
                JobStatus::Active | JobStatus::Failed => continue,
            };
            decided.push((job.id, next));
        }

        let now = self.clock.now();
        let mut state = self.state.write();
        let mut applied = Vec::with_capacity(decided.len());
        for (id, next) in decided {
            match state.jobs.advance(&id, next, now) {
                Ok(record) => {
                    if next.is_terminal() {
                        info!(
                            "[fh-backend] Job {} {} (content {})",
                            id, next, record.content_id
                        );
                    } else {
                        debug!("[fh-backend] Job {} -> {}", id, next);
                    }
                    applied.push((id, next));
                }
                Err(e) => debug!("[fh-backend] Job {} not advanced: {}", id, e),
            }
        }
        applied
    }

    /// Write `data` unless identical content is already stored.
    async fn persist(&self, id: &ContentId, data: &[u8]) -> Result<(), BackendError> {
        if self.blobs.contains(id).await? {
            debug!("[fh-backend] Content {} already stored", id);
            return Ok(());
        }
        self.blobs.put(id, data).await
    }

    /// Debit `fee` from `payer` to the collector, reserved until the payload
    /// is stored.
    fn hold_fee(&self, payer: &Address, fee: Amount) -> Result<Transaction, BackendError> {
        let mut guard = self.state.write();
        let SimState {
            ledger, overrides, ..
        } = &mut *guard;

        ledger.transfer_held(payer, &self.fee_collector, fee, || {
            Self::stamp(overrides, self.clock.as_ref(), StampSource::Fresh)
        })
    }

    /// Return a reserved fee. The collector cannot have spent it, so this
    /// only fails on a ledger defect.
    fn refund_fee(&self, payer: &Address, fee: Amount) {
        let refund = {
            let mut guard = self.state.write();
            let SimState {
                ledger, overrides, ..
            } = &mut *guard;
            ledger.refund_held(&self.fee_collector, payer, fee, || {
                Self::stamp(overrides, self.clock.as_ref(), StampSource::Fresh)
            })
        };
        match refund {
            Ok(tx) => info!("[fh-backend] Refunded fee {} to {} ({})", fee, payer, tx.id),
            Err(e) => error!(
                "[fh-backend] Fee refund of {} to {} failed: {}",
                fee, payer, e
            ),
        }
    }
}

#[async_trait]
impl WalletBackend for InMemorySimulation {
    async fn new_address(&self) -> Result<Address, BackendError> {
        let pending = self.state.write().overrides.take_address();
        if let Some(addr) = pending {
            debug!("[fh-backend] Issued override address {}", addr);
            return Ok(addr);
        }
        let addr = self.identities.generate()?;
        debug!("[fh-backend] Issued address {}", addr);
        Ok(addr)
    }

    async fn balance(&self, addr: &Address) -> Result<Amount, BackendError> {
        Ok(self.balance_of(addr))
    }

    async fn send(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TxId, BackendError> {
        match self.transfer(from, to, amount, StampSource::Overridable) {
            Ok(tx) => {
                debug!("[fh-backend] Sent {} from {} to {} ({})", amount, from, to, tx.id);
                Ok(tx.id)
            }
            Err(e) => {
                warn!("[fh-backend] Send from {} to {} rejected: {}", from, to, e);
                Err(e)
            }
        }
    }

    async fn transactions(
        &self,
        addr: &Address,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, BackendError> {
        Ok(self.history(addr, Page::new(limit, offset)))
    }
}

#[async_trait]
impl ContentBackend for InMemorySimulation {
    /// The fee moves to the collector before the payload is written but stays
    /// reserved there until the write succeeds; a failed write returns it.
    async fn store(
        &self,
        data: Vec<u8>,
        payer: &Address,
    ) -> Result<(JobId, ContentId), BackendError> {
        let content_id = ContentId::for_payload(&data);
        let size = data.len() as u64;
        let fee = self.fees.fee_for(size)?;

        if !fee.is_zero() {
            match self.hold_fee(payer, fee) {
                Ok(tx) => debug!(
                    "[fh-backend] Charged {} {} for {} ({})",
                    payer, fee, content_id, tx.id
                ),
                Err(e) => {
                    warn!("[fh-backend] Store by {} rejected: {}", payer, e);
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.persist(&content_id, &data).await {
            warn!("[fh-backend] Store of {} failed: {}", content_id, e);
            if !fee.is_zero() {
                self.refund_fee(payer, fee);
            }
            return Err(e);
        }

        let job_id = JobId::new_random();
        let record = JobRecord::submitted(
            job_id,
            content_id,
            payer.clone(),
            size,
            fee,
            self.clock.now(),
        );
        {
            let mut state = self.state.write();
            state.ledger.release_hold(&self.fee_collector, fee);
            state.jobs.insert(record);
        }

        info!(
            "[fh-backend] Job {} submitted for {} ({} bytes, fee {})",
            job_id, content_id, size, fee
        );
        Ok((job_id, content_id))
    }

    async fn job_status(&self, job: &JobId) -> Result<JobStatus, BackendError> {
        self.state.read().jobs.status(job)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, BackendError> {
        self.blobs
            .get(id)
            .await?
            .ok_or(BackendError::NotFound(NotFoundKind::Content(*id)))
    }
}

#[async_trait]
impl JobSealer for InMemorySimulation {
    async fn seal_pending(&self) -> usize {
        self.advance_jobs().await.len()
    }
}
