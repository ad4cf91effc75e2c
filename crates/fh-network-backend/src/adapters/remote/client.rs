//! Remote Client Adapter
//!
//! Implements the backend contract by forwarding every operation to a chain
//! node over a `ChainTransport`. Behavior matches the simulation: errors come
//! back as the same `BackendError` kinds, and payloads are verified against
//! their content id in both directions.

use super::retry::RetryPolicy;
use super::wire::{
    AddressParams, ImportParams, ImportResult, JobStatusParams, JobStatusResult, RetrieveParams,
    RetrieveResult, SendParams, TransactionsParams, TransactionsResult, CLIENT_IMPORT,
    CLIENT_JOB_STATUS, CLIENT_RETRIEVE, WALLET_BALANCE, WALLET_NEW, WALLET_SEND,
    WALLET_TRANSACTIONS,
};
use crate::ports::inbound::{ContentBackend, WalletBackend};
use crate::ports::outbound::ChainTransport;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{Address, Amount, BackendError, ContentId, JobId, JobStatus, Transaction, TxId};
use tracing::{debug, info};
use uuid::Uuid;

/// Backend that lives on a remote node.
pub struct RemoteClient<T: ChainTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ChainTransport> RemoteClient<T> {
    /// Wrap a transport.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        info!(
            "[fh-backend] Remote client ready (timeout {:?}, {} retries)",
            policy.call_timeout, policy.max_retries
        );
        Self { transport, policy }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn invoke<P, R>(&self, method: &'static str, params: &P) -> Result<R, BackendError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| BackendError::Transport(format!("{}: encode params: {}", method, e)))?;

        let raw = self
            .policy
            .run(method, || self.transport.call(method, params.clone()))
            .await?;

        debug!("[fh-backend] {} ok", method);
        serde_json::from_value(raw)
            .map_err(|e| BackendError::Transport(format!("{}: malformed result: {}", method, e)))
    }
}

#[async_trait]
impl<T: ChainTransport> WalletBackend for RemoteClient<T> {
    async fn new_address(&self) -> Result<Address, BackendError> {
        self.invoke(WALLET_NEW, &Value::Array(Vec::new())).await
    }

    async fn balance(&self, addr: &Address) -> Result<Amount, BackendError> {
        let params = AddressParams {
            address: addr.clone(),
        };
        self.invoke(WALLET_BALANCE, &params).await
    }

    async fn send(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<TxId, BackendError> {
        let params = SendParams {
            from: from.clone(),
            to: to.clone(),
            amount,
            request_id: Uuid::new_v4().to_string(),
        };
        self.invoke(WALLET_SEND, &params).await
    }

    async fn transactions(
        &self,
        addr: &Address,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, BackendError> {
        let params = TransactionsParams {
            address: addr.clone(),
            limit,
            offset,
        };
        let page: TransactionsResult = self.invoke(WALLET_TRANSACTIONS, &params).await?;
        Ok(page)
    }
}

#[async_trait]
impl<T: ChainTransport> ContentBackend for RemoteClient<T> {
    async fn store(
        &self,
        data: Vec<u8>,
        payer: &Address,
    ) -> Result<(JobId, ContentId), BackendError> {
        let expected = ContentId::for_payload(&data);
        let params = ImportParams {
            payer: payer.clone(),
            data_hex: hex::encode(&data),
            request_id: Uuid::new_v4().to_string(),
        };
        let result: ImportResult = self.invoke(CLIENT_IMPORT, &params).await?;

        if result.content_id != expected {
            return Err(BackendError::Transport(format!(
                "node stored payload {} as {}",
                expected, result.content_id
            )));
        }
        Ok((result.job_id, result.content_id))
    }

    async fn job_status(&self, job: &JobId) -> Result<JobStatus, BackendError> {
        let params = JobStatusParams { job_id: *job };
        let result: JobStatusResult = self.invoke(CLIENT_JOB_STATUS, &params).await?;
        Ok(result.status)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, BackendError> {
        let params = RetrieveParams { content_id: *id };
        let result: RetrieveResult = self.invoke(CLIENT_RETRIEVE, &params).await?;

        let bytes = hex::decode(&result.data_hex)
            .map_err(|e| BackendError::Transport(format!("{}: bad payload hex: {}", id, e)))?;
        if !id.matches(&bytes) {
            return Err(BackendError::Transport(format!(
                "{}: payload does not match its content id",
                id
            )));
        }
        Ok(bytes)
    }
}
