//! # Domain Invariants
//!
//! Business rules shared by the ledger and the job registry.

use shared_types::{Address, Amount, BackendError, JobStatus, Transaction};

/// Invariant: no overdraft.
///
/// A debit may never exceed the balance it is drawn from.
pub fn invariant_no_overdraft(required: Amount, available: Amount) -> Result<(), BackendError> {
    if required > available {
        return Err(BackendError::InsufficientFunds {
            required,
            available,
        });
    }
    Ok(())
}

/// Invariant: job transitions follow `Submitted -> Sealing -> {Active | Failed}`.
pub fn invariant_job_transition(from: JobStatus, to: JobStatus) -> Result<(), BackendError> {
    if !from.can_transition_to(to) {
        return Err(BackendError::InvalidJobTransition { from, to });
    }
    Ok(())
}

/// Recompute `addr`'s balance from its log alone.
///
/// `Σ to==addr − Σ from==addr`. A self-transfer is counted in both
/// directions and so nets to zero. Returns `None` if the log would drive the
/// balance negative or overflow, neither of which a log built by the ledger
/// can do.
pub fn derive_balance(addr: &Address, log: &[Transaction]) -> Option<Amount> {
    let mut incoming = Amount::zero();
    let mut outgoing = Amount::zero();
    for tx in log {
        if tx.credits(addr) {
            incoming = incoming.checked_add(tx.amount)?;
        }
        if tx.debits(addr) {
            outgoing = outgoing.checked_add(tx.amount)?;
        }
    }
    incoming.checked_sub(outgoing)
}
