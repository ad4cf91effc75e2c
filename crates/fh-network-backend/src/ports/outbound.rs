//! # Outbound Ports
//!
//! Traits for what the backend needs from its surroundings: a clock, key
//! material, payload storage and, for the remote variant, a wire to the
//! chain node.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::{Address, BackendError, ContentId};
use std::collections::VecDeque;

/// Time source for timestamps.
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Produces fresh payable identities.
pub trait IdentityGenerator: Send + Sync {
    /// Generate a new address from fresh key material.
    fn generate(&self) -> Result<Address, BackendError>;
}

/// Content-addressed payload storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `data` under `id`. Overwriting identical content is harmless.
    async fn put(&self, id: &ContentId, data: &[u8]) -> Result<(), BackendError>;

    /// Read the payload under `id`, `None` if absent.
    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, BackendError>;

    /// Whether a payload is stored under `id`.
    async fn contains(&self, id: &ContentId) -> Result<bool, BackendError>;
}

/// Request/response channel to a remote chain node.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Invoke `method` with JSON `params`, returning the JSON result.
    async fn call(&self, method: &str, params: Value) -> Result<Value, BackendError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Clock that returns a settable instant.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Move the clock.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Identity generator whose randomness source is unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingIdentityGenerator;

impl IdentityGenerator for FailingIdentityGenerator {
    fn generate(&self) -> Result<Address, BackendError> {
        Err(BackendError::GenerationError(
            "entropy source unavailable".to_string(),
        ))
    }
}

/// One scripted transport outcome.
#[derive(Clone, Debug)]
pub enum Scripted {
    /// Answer immediately.
    Reply(Result<Value, BackendError>),
    /// Never answer.
    Hang,
}

/// Transport replaying a queue of outcomes and recording every call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    /// Transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result.
    pub fn push_ok(&self, result: Value) -> &Self {
        self.script.lock().push_back(Scripted::Reply(Ok(result)));
        self
    }

    /// Queue an error.
    pub fn push_err(&self, err: BackendError) -> &Self {
        self.script.lock().push_back(Scripted::Reply(Err(err)));
        self
    }

    /// Queue a call that never completes.
    pub fn push_hang(&self) -> &Self {
        self.script.lock().push_back(Scripted::Hang);
        self
    }

    /// Methods and params received so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChainTransport for ScriptedTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        self.calls.lock().push((method.to_string(), params));
        let next = self.script.lock().pop_front();
        match next {
            Some(Scripted::Reply(result)) => result,
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(BackendError::Transport(format!(
                "no scripted response for {}",
                method
            ))),
        }
    }
}
