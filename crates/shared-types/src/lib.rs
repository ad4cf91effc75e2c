//! # Shared Types Crate
//!
//! Value types exchanged between the Filehive network backends and the API
//! layer that calls them.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every backend variant (simulation or remote
//!   client) speaks in these types, so swapping variants never changes what a
//!   caller sees.
//! - **Canonical forms**: addresses and identifiers compare by their canonical
//!   string form and serialize as that string.
//! - **No silent overflow**: `Amount` only exposes checked arithmetic.

pub mod amount;
pub mod entities;
pub mod errors;
pub mod identifiers;

pub use amount::*;
pub use entities::*;
pub use errors::*;
pub use identifiers::*;
