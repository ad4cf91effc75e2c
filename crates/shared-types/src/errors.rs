//! # Error Types
//!
//! The error vocabulary every backend variant returns.
//!
//! Each failure case has a stable [`BackendErrorKind`] so the API layer can
//! translate it to a transport status without matching on messages. The same
//! kinds travel over JSON-RPC as numeric codes.

use crate::amount::Amount;
use crate::entities::JobStatus;
use crate::identifiers::{ContentId, JobId};
use std::fmt;
use thiserror::Error;

/// What a `NotFound` error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    /// Unknown storage job.
    Job(JobId),
    /// Unknown content.
    Content(ContentId),
    /// Identified only by the remote peer's message.
    Remote(String),
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundKind::Job(id) => write!(f, "job {}", id),
            NotFoundKind::Content(id) => write!(f, "content {}", id),
            NotFoundKind::Remote(what) => f.write_str(what),
        }
    }
}

/// Errors returned by backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transfer or fee exceeds the debited address's balance.
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needed.
        required: Amount,
        /// Balance at the time of the check.
        available: Amount,
    },

    /// Unknown job or content identifier.
    #[error("Not found: {0}")]
    NotFound(NotFoundKind),

    /// Identity or key material could not be produced.
    #[error("Address generation failed: {0}")]
    GenerationError(String),

    /// Non-positive or malformed amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed address string.
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// Malformed content, transaction or job identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Amount arithmetic exceeded 256 bits.
    #[error("Amount overflow")]
    AmountOverflow,

    /// A job was asked to move along an edge the state machine lacks.
    #[error("Invalid job transition: {from} -> {to}")]
    InvalidJobTransition {
        /// Current state.
        from: JobStatus,
        /// Attempted state.
        to: JobStatus,
    },

    /// Payload storage I/O failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The remote peer could not be reached or answered garbage.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A remote call exceeded its deadline.
    #[error("Call {method} timed out after {after_ms}ms")]
    Timeout {
        /// RPC method name.
        method: String,
        /// Deadline that elapsed.
        after_ms: u64,
    },

    /// The remote peer returned an error with no local equivalent.
    #[error("Remote error {code}: {message}")]
    Remote {
        /// Remote error code.
        code: i64,
        /// Remote error message.
        message: String,
    },
}

/// Stable discriminant of a [`BackendError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    /// See [`BackendError::InsufficientFunds`].
    InsufficientFunds,
    /// See [`BackendError::NotFound`].
    NotFound,
    /// See [`BackendError::GenerationError`].
    GenerationError,
    /// See [`BackendError::InvalidAmount`] and [`BackendError::AmountOverflow`].
    InvalidAmount,
    /// Malformed addresses, identifiers and illegal job transitions.
    InvalidInput,
    /// See [`BackendError::Storage`].
    Storage,
    /// See [`BackendError::Transport`], [`BackendError::Timeout`] and [`BackendError::Remote`].
    Unavailable,
}

impl BackendErrorKind {
    /// JSON-RPC error code for this kind.
    pub fn rpc_code(&self) -> i64 {
        match self {
            Self::InsufficientFunds => 1001,
            Self::NotFound => 1002,
            Self::GenerationError => 1003,
            Self::InvalidAmount => 1004,
            Self::InvalidInput => 1005,
            Self::Storage => 1006,
            Self::Unavailable => 1007,
        }
    }
}

impl BackendError {
    /// Stable kind of this error.
    pub fn kind(&self) -> BackendErrorKind {
        match self {
            Self::InsufficientFunds { .. } => BackendErrorKind::InsufficientFunds,
            Self::NotFound(_) => BackendErrorKind::NotFound,
            Self::GenerationError(_) => BackendErrorKind::GenerationError,
            Self::InvalidAmount(_) | Self::AmountOverflow => BackendErrorKind::InvalidAmount,
            Self::InvalidAddress(_)
            | Self::InvalidIdentifier(_)
            | Self::InvalidJobTransition { .. } => BackendErrorKind::InvalidInput,
            Self::Storage(_) => BackendErrorKind::Storage,
            Self::Transport(_) | Self::Timeout { .. } | Self::Remote { .. } => {
                BackendErrorKind::Unavailable
            }
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }

    /// Rebuild a local error from a remote JSON-RPC error.
    ///
    /// Codes without a local kind, or whose payload cannot be recovered from
    /// the message, become [`BackendError::Remote`].
    pub fn from_rpc(code: i64, message: String) -> Self {
        match code {
            1001 => Self::InsufficientFunds {
                required: Amount::zero(),
                available: Amount::zero(),
            },
            1002 => Self::NotFound(NotFoundKind::Remote(message)),
            1003 => Self::GenerationError(message),
            1004 => Self::InvalidAmount(message),
            1005 => Self::InvalidIdentifier(message),
            1006 => Self::Storage(message),
            _ => Self::Remote { code, message },
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Storage(e.to_string())
    }
}
