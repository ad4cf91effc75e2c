//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Address`
//! - **Ledger**: `Transaction`, `TransactionView`
//! - **Storage**: `JobStatus`

use crate::amount::Amount;
use crate::errors::BackendError;
use crate::identifiers::TxId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A payable identity on the storage network.
///
/// Opaque to the ledger: two addresses are the same identity exactly when
/// their canonical (lowercase) strings are equal. The accepted shape is a
/// network letter (`f` mainnet, `t` testnet), a protocol digit `0..=4`, then
/// a lowercase alphanumeric payload.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and canonicalise an address string.
    pub fn parse(s: &str) -> Result<Self, BackendError> {
        let canonical = s.trim().to_ascii_lowercase();
        let bytes = canonical.as_bytes();

        let well_formed = bytes.len() > 2
            && matches!(bytes[0], b'f' | b't')
            && (b'0'..=b'4').contains(&bytes[1])
            && bytes[2..].iter().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());

        if !well_formed {
            return Err(BackendError::InvalidAddress(s.to_string()));
        }
        Ok(Self(canonical))
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Protocol digit (`1` for secp256k1 key addresses).
    pub fn protocol(&self) -> u8 {
        self.0.as_bytes()[1] - b'0'
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl FromStr for Address {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = BackendError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> String {
        addr.0
    }
}

// =============================================================================
// CLUSTER B: LEDGER
// =============================================================================

/// An immutable ledger entry.
///
/// `from` is `None` for a mint (administrative credit with no debited source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub id: TxId,
    /// Debited address, absent for mints.
    pub from: Option<Address>,
    /// Credited address.
    pub to: Address,
    /// Transferred amount in minor units.
    pub amount: Amount,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Whether this entry is a mint.
    pub fn is_mint(&self) -> bool {
        self.from.is_none()
    }

    /// Whether `addr` is credited by this entry.
    pub fn credits(&self, addr: &Address) -> bool {
        &self.to == addr
    }

    /// Whether `addr` is debited by this entry.
    ///
    /// A self-transfer credits and debits the same address; callers computing
    /// balances must count it once in each direction or not at all.
    pub fn debits(&self, addr: &Address) -> bool {
        self.from.as_ref() == Some(addr)
    }
}

/// JSON shape of a transaction as surfaced to the API layer.
///
/// `from` is the empty string for mints, `amount` is in major units and
/// `timestamp` is RFC 3339 in UTC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// Credited address.
    pub to: String,
    /// Debited address, or `""` for mints.
    pub from: String,
    /// Transaction identifier.
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    /// Amount in major units.
    pub amount: f64,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            to: tx.to.to_string(),
            from: tx.from.as_ref().map(Address::to_string).unwrap_or_default(),
            transaction_id: tx.id.to_string(),
            amount: tx.amount.to_major_f64(),
            timestamp: tx.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

// =============================================================================
// CLUSTER C: STORAGE
// =============================================================================

/// Storage job state machine.
///
/// `Submitted -> Sealing -> {Active | Failed}`. `Active` and `Failed` are
/// terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted and paid for, not yet picked up.
    #[default]
    Submitted,
    /// Payload being sealed into storage.
    Sealing,
    /// Payload stored and retrievable.
    Active,
    /// Sealing failed; the payload is not stored under this job.
    Failed,
}

impl JobStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Sealing)
                | (Self::Sealing, Self::Active)
                | (Self::Sealing, Self::Failed)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Failed)
    }

    /// Status token as exchanged on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Sealing => "sealing",
            Self::Active => "active",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "submitted" => Ok(Self::Submitted),
            "sealing" => Ok(Self::Sealing),
            "active" => Ok(Self::Active),
            "failed" => Ok(Self::Failed),
            other => Err(BackendError::InvalidIdentifier(format!(
                "job status {:?}",
                other
            ))),
        }
    }
}
