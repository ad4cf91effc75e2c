//! # Ledger State
//!
//! Append-only per-address transaction logs and the balances derived from
//! them.
//!
//! `LedgerState` is plain data: it has no lock of its own. Adapters wrap it in
//! a single `RwLock` so that the balance check and the append of a transfer
//! happen inside one exclusive borrow.

use super::invariants::invariant_no_overdraft;
use super::pagination::Page;
use chrono::{DateTime, Utc};
use shared_types::{Address, Amount, BackendError, Transaction, TxId};
use std::collections::HashMap;

/// Identifier and timestamp assigned to a new entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp {
    /// Transaction identifier.
    pub id: TxId,
    /// Append time.
    pub timestamp: DateTime<Utc>,
}

/// One address's log plus running totals over it.
#[derive(Clone, Debug, Default)]
struct AccountLog {
    entries: Vec<Transaction>,
    /// Σ amount where `to == address`.
    incoming: Amount,
    /// Σ amount where `from == address`.
    outgoing: Amount,
    /// Part of the balance reserved by `transfer_held`, not spendable.
    held: Amount,
}

impl AccountLog {
    fn balance(&self) -> Amount {
        // incoming >= outgoing holds for every log built through `LedgerState`.
        self.incoming.checked_sub(self.outgoing).unwrap_or_default()
    }

    fn spendable(&self) -> Amount {
        self.balance().checked_sub(self.held).unwrap_or_default()
    }
}

/// Ledger state: Address -> ordered sequence of transactions.
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    accounts: HashMap<Address, AccountLog>,
}

impl LedgerState {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `addr`. Unknown addresses hold zero.
    pub fn balance(&self, addr: &Address) -> Amount {
        self.accounts
            .get(addr)
            .map(AccountLog::balance)
            .unwrap_or_default()
    }

    /// Balance of `addr` minus amounts reserved by `transfer_held`.
    pub fn spendable(&self, addr: &Address) -> Amount {
        self.accounts
            .get(addr)
            .map(AccountLog::spendable)
            .unwrap_or_default()
    }

    /// Reserved part of `addr`'s balance.
    pub fn held(&self, addr: &Address) -> Amount {
        self.accounts.get(addr).map(|a| a.held).unwrap_or_default()
    }

    /// Number of entries in `addr`'s log.
    pub fn log_len(&self, addr: &Address) -> usize {
        self.accounts.get(addr).map_or(0, |a| a.entries.len())
    }

    /// Full log of `addr`, oldest first.
    pub fn log(&self, addr: &Address) -> &[Transaction] {
        self.accounts
            .get(addr)
            .map(|a| a.entries.as_slice())
            .unwrap_or_default()
    }

    /// A page of `addr`'s log, oldest first.
    pub fn page(&self, addr: &Address, page: Page) -> Vec<Transaction> {
        let log = self.log(addr);
        log[page.range(log.len())].to_vec()
    }

    /// Number of addresses with at least one entry.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Credit `to` with no debited source.
    ///
    /// `stamp` is only invoked once the mint is known to succeed.
    pub fn mint(
        &mut self,
        to: &Address,
        amount: Amount,
        stamp: impl FnOnce() -> Stamp,
    ) -> Result<Transaction, BackendError> {
        let incoming = self
            .account_totals(to)
            .0
            .checked_add(amount)
            .ok_or(BackendError::AmountOverflow)?;

        let Stamp { id, timestamp } = stamp();
        let tx = Transaction {
            id,
            from: None,
            to: to.clone(),
            amount,
            timestamp,
        };

        let account = self.accounts.entry(to.clone()).or_default();
        account.incoming = incoming;
        account.entries.push(tx.clone());
        Ok(tx)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Rejected with `InsufficientFunds` before anything is appended when
    /// `amount` exceeds what `from` can spend. A self-transfer appends exactly
    /// one entry and leaves the balance unchanged. `stamp` is only invoked once
    /// the transfer is known to succeed.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        stamp: impl FnOnce() -> Stamp,
    ) -> Result<Transaction, BackendError> {
        self.append_transfer(from, to, amount, false, stamp)
    }

    /// Transfer whose credit stays reserved on `to` until `release_hold` or
    /// `refund_held`.
    ///
    /// The reserved amount counts towards `to`'s balance but cannot be spent,
    /// so a later `refund_held` of it always has the funds.
    pub fn transfer_held(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        stamp: impl FnOnce() -> Stamp,
    ) -> Result<Transaction, BackendError> {
        self.append_transfer(from, to, amount, true, stamp)
    }

    /// Make a reserved `amount` on `holder` spendable again.
    pub fn release_hold(&mut self, holder: &Address, amount: Amount) {
        if let Some(account) = self.accounts.get_mut(holder) {
            account.held = account.held.checked_sub(amount).unwrap_or_default();
        }
    }

    /// Return a reserved `amount` from `holder` to `to`.
    pub fn refund_held(
        &mut self,
        holder: &Address,
        to: &Address,
        amount: Amount,
        stamp: impl FnOnce() -> Stamp,
    ) -> Result<Transaction, BackendError> {
        if self.held(holder) < amount {
            return Err(BackendError::InsufficientFunds {
                required: amount,
                available: self.held(holder),
            });
        }
        self.release_hold(holder, amount);
        self.append_transfer(holder, to, amount, false, stamp)
    }

    fn append_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        hold: bool,
        stamp: impl FnOnce() -> Stamp,
    ) -> Result<Transaction, BackendError> {
        invariant_no_overdraft(amount, self.spendable(from))?;

        let (to_incoming, _) = self.account_totals(to);
        let to_incoming = to_incoming
            .checked_add(amount)
            .ok_or(BackendError::AmountOverflow)?;
        let to_held = if hold {
            self.held(to)
                .checked_add(amount)
                .ok_or(BackendError::AmountOverflow)?
        } else {
            self.held(to)
        };
        let (_, from_outgoing) = self.account_totals(from);
        let from_outgoing = from_outgoing
            .checked_add(amount)
            .ok_or(BackendError::AmountOverflow)?;

        let Stamp { id, timestamp } = stamp();
        let tx = Transaction {
            id,
            from: Some(from.clone()),
            to: to.clone(),
            amount,
            timestamp,
        };

        let receiver = self.accounts.entry(to.clone()).or_default();
        receiver.incoming = to_incoming;
        receiver.held = to_held;
        receiver.entries.push(tx.clone());

        let sender = self.accounts.entry(from.clone()).or_default();
        sender.outgoing = from_outgoing;
        if from != to {
            sender.entries.push(tx.clone());
        }
        Ok(tx)
    }

    fn account_totals(&self, addr: &Address) -> (Amount, Amount) {
        self.accounts
            .get(addr)
            .map(|a| (a.incoming, a.outgoing))
            .unwrap_or_default()
    }
}
