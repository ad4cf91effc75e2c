//! # Adapters Layer (Hexagonal Architecture)
//!
//! Backend variants and the outbound port implementations they use.

mod blob_store;
mod identity;
mod remote;
mod simulation;
mod time;

pub use blob_store::{FileBlobStore, InMemoryBlobStore};
pub use identity::Secp256k1IdentityGenerator;
pub use remote::{
    HttpJsonRpcTransport, JsonRpcError, RemoteClient, RetryPolicy, CLIENT_IMPORT,
    CLIENT_JOB_STATUS, CLIENT_RETRIEVE, WALLET_BALANCE, WALLET_NEW, WALLET_SEND,
    WALLET_TRANSACTIONS,
};
pub use simulation::{InMemorySimulation, DEFAULT_FEE_COLLECTOR};
pub use time::SystemTimeSource;
