//! JSON-RPC method names and parameter/result shapes for the remote node.
//!
//! Payload bytes travel hex-encoded. Amounts travel as decimal minor-unit
//! strings (the `Amount` serde form).

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, ContentId, JobId, JobStatus, Transaction};

/// Issue an address.
pub const WALLET_NEW: &str = "Filehive.WalletNew";
/// Balance of an address.
pub const WALLET_BALANCE: &str = "Filehive.WalletBalance";
/// Transfer funds.
pub const WALLET_SEND: &str = "Filehive.WalletSend";
/// Paginated history.
pub const WALLET_TRANSACTIONS: &str = "Filehive.WalletTransactions";
/// Submit a payload for storage.
pub const CLIENT_IMPORT: &str = "Filehive.ClientImport";
/// Poll a storage job.
pub const CLIENT_JOB_STATUS: &str = "Filehive.ClientJobStatus";
/// Fetch a stored payload.
pub const CLIENT_RETRIEVE: &str = "Filehive.ClientRetrieve";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParams {
    pub address: Address,
}

/// `requestId` is fixed for one logical send across retries so the node can
/// drop duplicates of a call whose first attempt did land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsParams {
    pub address: Address,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportParams {
    pub payer: Address,
    pub data_hex: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub job_id: JobId,
    pub content_id: ContentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusParams {
    pub job_id: JobId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResult {
    pub status: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveParams {
    pub content_id: ContentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResult {
    pub data_hex: String,
}

/// History page as returned by the node.
pub type TransactionsResult = Vec<Transaction>;
