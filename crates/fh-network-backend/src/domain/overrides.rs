//! # Pending Overrides
//!
//! Single-use values that replace the next generated address, transaction id
//! or timestamp. Used to make simulation output reproducible in tests.
//!
//! Lives next to the ledger inside the same lock: setting and consuming an
//! override are both mutations of backend state.

use chrono::{DateTime, Utc};
use shared_types::{Address, TxId};

/// At most one pending value of each kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingOverrides {
    next_address: Option<Address>,
    next_txid: Option<TxId>,
    next_time: Option<DateTime<Utc>>,
}

impl PendingOverrides {
    /// No overrides pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the address returned by the next `new_address`.
    pub fn set_address(&mut self, addr: Address) {
        self.next_address = Some(addr);
    }

    /// Replace the id of the next ledger entry created by `send` or a mint.
    pub fn set_txid(&mut self, id: TxId) {
        self.next_txid = Some(id);
    }

    /// Replace the timestamp of the next ledger entry created by `send` or a mint.
    pub fn set_time(&mut self, at: DateTime<Utc>) {
        self.next_time = Some(at);
    }

    /// Consume the pending address, if any.
    pub fn take_address(&mut self) -> Option<Address> {
        self.next_address.take()
    }

    /// Consume the pending transaction id, if any.
    pub fn take_txid(&mut self) -> Option<TxId> {
        self.next_txid.take()
    }

    /// Consume the pending timestamp, if any.
    pub fn take_time(&mut self) -> Option<DateTime<Utc>> {
        self.next_time.take()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.next_address.is_none() && self.next_txid.is_none() && self.next_time.is_none()
    }
}
