//! Remote chain node client.

mod client;
mod http;
mod retry;
pub(crate) mod wire;

pub use client::RemoteClient;
pub use http::{HttpJsonRpcTransport, JsonRpcError};
pub use retry::RetryPolicy;
pub use wire::{
    CLIENT_IMPORT, CLIENT_JOB_STATUS, CLIENT_RETRIEVE, WALLET_BALANCE, WALLET_NEW, WALLET_SEND,
    WALLET_TRANSACTIONS,
};
