//! # Identifiers
//!
//! Content, transaction and job identifiers.
//!
//! Content and transaction identifiers share the CIDv1 shape used by the
//! storage network: a multibase `b` prefix followed by the lowercase base32
//! encoding of `<version><codec><multihash-code><digest-len><digest>`.
//! Job identifiers are UUIDs and deliberately unrelated to content.

use crate::errors::BackendError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// CID version byte.
const CID_VERSION: u8 = 0x01;
/// Multicodec for raw bytes.
const CODEC_RAW: u8 = 0x55;
/// Multihash code for sha2-256.
const MULTIHASH_SHA2_256: u8 = 0x12;
/// Digest length for sha2-256.
const DIGEST_LEN: u8 = 0x20;
/// Multibase prefix for lowercase base32 without padding.
const MULTIBASE_BASE32: char = 'b';

const CID_PREFIX: [u8; 4] = [CID_VERSION, CODEC_RAW, MULTIHASH_SHA2_256, DIGEST_LEN];

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Encode bytes as lowercase RFC 4648 base32 without padding.
pub fn base32_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode lowercase RFC 4648 base32 without padding.
///
/// Returns `None` on any character outside the alphabet.
pub fn base32_decode(encoded: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for c in encoded.bytes() {
        let value = match c {
            b'a'..=b'z' => c - b'a',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    Some(out)
}

/// Raw CID: a sha2-256 digest with its canonical text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Cid {
    digest: Hash,
}

impl Cid {
    fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(CID_PREFIX.len() + self.digest.len());
        bytes.extend_from_slice(&CID_PREFIX);
        bytes.extend_from_slice(&self.digest);

        let mut s = String::with_capacity(60);
        s.push(MULTIBASE_BASE32);
        s.push_str(&base32_encode(&bytes));
        s
    }

    fn decode(s: &str) -> Option<Self> {
        let body = s.strip_prefix(MULTIBASE_BASE32)?;
        let bytes = base32_decode(body)?;
        if bytes.len() != CID_PREFIX.len() + DIGEST_LEN as usize {
            return None;
        }
        if bytes[..CID_PREFIX.len()] != CID_PREFIX {
            return None;
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[CID_PREFIX.len()..]);
        Some(Self { digest })
    }
}

/// Identifier of a stored payload, derived from the payload bytes.
///
/// Identical payloads always map to the same identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(Cid);

impl ContentId {
    /// Derive the identifier of a payload.
    pub fn for_payload(data: &[u8]) -> Self {
        Self(Cid {
            digest: Sha256::digest(data).into(),
        })
    }

    /// Build from an already computed sha2-256 digest.
    pub fn from_digest(digest: Hash) -> Self {
        Self(Cid { digest })
    }

    /// The sha2-256 digest this identifier names.
    pub fn digest(&self) -> &Hash {
        &self.0.digest
    }

    /// Whether `data` hashes to this identifier.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::for_payload(data) == *self
    }
}

/// Identifier of a ledger transaction. Same text shape as [`ContentId`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxId(Cid);

impl TxId {
    /// Build from 32 bytes of identifier material.
    pub fn from_bytes(bytes: Hash) -> Self {
        Self(Cid { digest: bytes })
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0.digest
    }
}

macro_rules! cid_text_impls {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0.encode())
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.0.encode())
            }
        }

        impl FromStr for $ty {
            type Err = BackendError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Cid::decode(s.trim())
                    .map(Self)
                    .ok_or_else(|| BackendError::InvalidIdentifier(format!("{} {:?}", $what, s)))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = BackendError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> String {
                id.to_string()
            }
        }
    };
}

cid_text_impls!(ContentId, "content id");
cid_text_impls!(TxId, "transaction id");

/// Identifier of a storage job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Allocate a fresh random job identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| BackendError::InvalidIdentifier(format!("job id {:?}", s)))
    }
}
