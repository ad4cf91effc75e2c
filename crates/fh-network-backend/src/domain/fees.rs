//! # Storage Fees
//!
//! `fee(len) = base_fee + per_kib_fee * ceil(len / 1024)`, in minor units.

use serde::{Deserialize, Serialize};
use shared_types::{Amount, BackendError};

/// Default flat fee per stored payload: 0.001 major units.
pub const DEFAULT_BASE_FEE: u128 = 1_000_000_000_000_000;

/// Default fee per started KiB: 0.000001 major units.
pub const DEFAULT_PER_KIB_FEE: u128 = 1_000_000_000_000;

const KIB: u64 = 1024;

/// Price list for `store`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Charged once per payload.
    pub base_fee: Amount,
    /// Charged per started KiB of payload.
    pub per_kib_fee: Amount,
}

impl FeeSchedule {
    /// Schedule that charges nothing.
    pub fn free() -> Self {
        Self {
            base_fee: Amount::zero(),
            per_kib_fee: Amount::zero(),
        }
    }

    /// Whether `store` charges anything under this schedule.
    pub fn is_free(&self) -> bool {
        self.base_fee.is_zero() && self.per_kib_fee.is_zero()
    }

    /// Fee for a payload of `len` bytes.
    pub fn fee_for(&self, len: u64) -> Result<Amount, BackendError> {
        let kib = len.div_ceil(KIB);
        self.per_kib_fee
            .checked_mul(kib)
            .and_then(|variable| variable.checked_add(self.base_fee))
            .ok_or(BackendError::AmountOverflow)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee: Amount::from_minor(DEFAULT_BASE_FEE),
            per_kib_fee: Amount::from_minor(DEFAULT_PER_KIB_FEE),
        }
    }
}
