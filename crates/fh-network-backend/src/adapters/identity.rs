//! Secp256k1 identity adapter.
//!
//! Implements `IdentityGenerator` with keys drawn from the OS random number
//! generator. The secret key is discarded once the address is derived: key
//! custody is not this backend's concern.

use crate::domain::address_from_public_key;
use crate::ports::outbound::IdentityGenerator;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::rngs::OsRng;
use rand::RngCore;
use shared_types::{Address, BackendError};

/// Attempts before giving up on drawing a valid scalar.
const MAX_KEY_ATTEMPTS: usize = 4;

/// Generates `f1` addresses from fresh secp256k1 keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1IdentityGenerator;

impl Secp256k1IdentityGenerator {
    fn random_secret() -> Result<SecretKey, BackendError> {
        let mut bytes = [0u8; 32];
        for _ in 0..MAX_KEY_ATTEMPTS {
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| BackendError::GenerationError(e.to_string()))?;
            // Zero and values >= the curve order are rejected; redraw.
            if let Ok(key) = SecretKey::from_slice(&bytes) {
                return Ok(key);
            }
        }
        Err(BackendError::GenerationError(
            "no valid secp256k1 scalar drawn".to_string(),
        ))
    }
}

impl IdentityGenerator for Secp256k1IdentityGenerator {
    fn generate(&self) -> Result<Address, BackendError> {
        let secret = Self::random_secret()?;
        let public = secret.public_key().to_encoded_point(true);
        address_from_public_key(public.as_bytes())
    }
}
