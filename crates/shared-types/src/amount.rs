//! # Amounts
//!
//! Non-negative token amounts held in minor units (10^-18 of a major unit).
//!
//! Arithmetic is checked only: there is no `Add`/`Sub` impl, so an overflow
//! or underflow can never wrap silently.

use crate::errors::BackendError;
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of decimal places between minor and major units.
pub const MAJOR_UNIT_DECIMALS: usize = 18;

/// A token amount in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(U256);

fn major_unit() -> U256 {
    U256::exp10(MAJOR_UNIT_DECIMALS)
}

impl Amount {
    /// Zero.
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Largest representable amount.
    pub fn max_value() -> Self {
        Self(U256::MAX)
    }

    /// Build from a minor-unit count.
    pub fn from_minor(minor: u128) -> Self {
        Self(U256::from(minor))
    }

    /// Build from a whole number of major units.
    pub fn from_major(major: u64) -> Self {
        Self(U256::from(major) * major_unit())
    }

    /// Wrap a raw 256-bit value.
    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// The raw minor-unit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Whether this is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self + other`, or `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    /// `self - other`, or `None` if `other > self`.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `self * factor`, or `None` on overflow.
    pub fn checked_mul(self, factor: u64) -> Option<Amount> {
        self.0.checked_mul(U256::from(factor)).map(Self)
    }

    /// Parse a decimal string of minor units, e.g. `"15500000000000000000"`.
    pub fn from_minor_str(s: &str) -> Result<Self, BackendError> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BackendError::InvalidAmount(format!("{:?}", s)));
        }
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|_| BackendError::InvalidAmount(format!("{:?} exceeds 256 bits", s)))
    }

    /// Parse a decimal string of major units, e.g. `"15.5"`.
    ///
    /// At most [`MAJOR_UNIT_DECIMALS`] fractional digits are accepted; signs,
    /// exponents and separators are rejected.
    pub fn from_major_str(s: &str) -> Result<Self, BackendError> {
        let s = s.trim();
        let invalid = || BackendError::InvalidAmount(format!("{:?}", s));

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > MAJOR_UNIT_DECIMALS {
            return Err(BackendError::InvalidAmount(format!(
                "{:?} has more than {} decimal places",
                s, MAJOR_UNIT_DECIMALS
            )));
        }

        let whole = if whole.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(whole).map_err(|_| invalid())?
        };
        let frac = if frac.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac, width = MAJOR_UNIT_DECIMALS);
            U256::from_dec_str(&padded).map_err(|_| invalid())?
        };

        whole
            .checked_mul(major_unit())
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or(BackendError::AmountOverflow)
    }

    /// Exact decimal rendering in major units, without trailing zeros.
    pub fn to_major_string(&self) -> String {
        let (whole, frac) = self.0.div_mod(major_unit());
        if frac.is_zero() {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = MAJOR_UNIT_DECIMALS);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    /// Major units as a float, for JSON views that expect a number.
    pub fn to_major_f64(&self) -> f64 {
        self.to_major_string().parse().unwrap_or(f64::MAX)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(minor: u64) -> Self {
        Self(U256::from(minor))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_minor_str(&s).map_err(serde::de::Error::custom)
    }
}
