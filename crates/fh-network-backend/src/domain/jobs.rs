//! # Storage Jobs
//!
//! One record per `store` call. A record only ever moves forward through
//! `Submitted -> Sealing -> {Active | Failed}`.

use super::invariants::invariant_job_transition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, BackendError, ContentId, JobId, JobStatus, NotFoundKind};
use std::collections::HashMap;

/// A storage request and its progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identifier.
    pub id: JobId,
    /// Payload the job concerns.
    pub content_id: ContentId,
    /// Address that paid for the job.
    pub payer: Address,
    /// Payload size in bytes.
    pub size: u64,
    /// Fee charged at submission.
    pub fee: Amount,
    /// Current state.
    pub status: JobStatus,
    /// When `store` accepted the payload.
    pub submitted_at: DateTime<Utc>,
    /// Last state change.
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// A freshly accepted job.
    pub fn submitted(
        id: JobId,
        content_id: ContentId,
        payer: Address,
        size: u64,
        fee: Amount,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content_id,
            payer,
            size,
            fee,
            status: JobStatus::Submitted,
            submitted_at: at,
            updated_at: at,
        }
    }
}

/// Job registry: JobId -> record, remembering submission order.
#[derive(Clone, Debug, Default)]
pub struct JobRegistry {
    records: HashMap<JobId, JobRecord>,
    order: Vec<JobId>,
}

impl JobRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new job.
    pub fn insert(&mut self, record: JobRecord) {
        let id = record.id;
        if self.records.insert(id, record).is_none() {
            self.order.push(id);
        }
    }

    /// Look up a job.
    pub fn get(&self, id: &JobId) -> Option<&JobRecord> {
        self.records.get(id)
    }

    /// Current status of a job.
    pub fn status(&self, id: &JobId) -> Result<JobStatus, BackendError> {
        self.get(id)
            .map(|r| r.status)
            .ok_or(BackendError::NotFound(NotFoundKind::Job(*id)))
    }

    /// Move a job to `next`, rejecting edges outside the state machine.
    pub fn advance(
        &mut self,
        id: &JobId,
        next: JobStatus,
        at: DateTime<Utc>,
    ) -> Result<&JobRecord, BackendError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or(BackendError::NotFound(NotFoundKind::Job(*id)))?;
        invariant_job_transition(record.status, next)?;
        record.status = next;
        record.updated_at = at;
        Ok(record)
    }

    /// Non-terminal jobs in submission order.
    pub fn pending(&self) -> Vec<JobRecord> {
        self.in_order()
            .filter(|r| !r.status.is_terminal())
            .cloned()
            .collect()
    }

    /// Jobs paid for by `payer`, in submission order.
    pub fn for_payer(&self, payer: &Address) -> Vec<JobRecord> {
        self.in_order()
            .filter(|r| &r.payer == payer)
            .cloned()
            .collect()
    }

    /// Total number of jobs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no job was ever submitted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn in_order(&self) -> impl Iterator<Item = &JobRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}
