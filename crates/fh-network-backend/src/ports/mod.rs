//! # Ports Module
//!
//! Hexagonal architecture ports (inbound contract, outbound dependencies).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
