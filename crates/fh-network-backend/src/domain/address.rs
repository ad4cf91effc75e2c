//! # Address Derivation
//!
//! Secp256k1 key addresses: `f1` followed by the base32 encoding of a 20-byte
//! payload and a 4-byte checksum.
//!
//! The payload is the first 20 bytes of SHA-256 over the compressed public
//! key; the checksum is the first 4 bytes of SHA-256 over the protocol byte
//! and the payload.

use sha2::{Digest, Sha256};
use shared_types::{base32_encode, Address, BackendError};

/// Protocol number of secp256k1 key addresses.
pub const SECP256K1_PROTOCOL: u8 = 1;

/// Payload length.
pub const PAYLOAD_LEN: usize = 20;

/// Checksum length.
pub const CHECKSUM_LEN: usize = 4;

/// Derive the address of a SEC1-encoded public key.
pub fn address_from_public_key(public_key: &[u8]) -> Result<Address, BackendError> {
    let digest = Sha256::digest(public_key);
    let payload = &digest[..PAYLOAD_LEN];

    let mut hasher = Sha256::new();
    hasher.update([SECP256K1_PROTOCOL]);
    hasher.update(payload);
    let checksum = hasher.finalize();

    let mut body = Vec::with_capacity(PAYLOAD_LEN + CHECKSUM_LEN);
    body.extend_from_slice(payload);
    body.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    let text = format!("f{}{}", SECP256K1_PROTOCOL, base32_encode(&body));
    Address::parse(&text).map_err(|e| BackendError::GenerationError(e.to_string()))
}
