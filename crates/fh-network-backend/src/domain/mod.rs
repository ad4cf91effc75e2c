//! # Domain Module
//!
//! Lock-free state and rules of the network backend. Nothing here performs
//! I/O; adapters own the locking and the payload storage.

pub mod address;
pub mod fees;
pub mod invariants;
pub mod jobs;
pub mod ledger;
pub mod overrides;
pub mod pagination;

pub use address::*;
pub use fees::*;
pub use invariants::*;
pub use jobs::*;
pub use ledger::*;
pub use overrides::*;
pub use pagination::*;
