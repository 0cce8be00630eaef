// Basic types for the ledger

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of a block digest rendered as lowercase hex (SHA-256)
pub const DIGEST_HEX_LEN: usize = 64;

/// Proof carried by every genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Wire value standing in for the genesis block's missing predecessor
const GENESIS_MARKER: u64 = 1;

/// Link from a block to its predecessor.
///
/// The genesis block has no predecessor, so it carries a sentinel that can
/// never be mistaken for a real digest. On the wire the sentinel is the bare
/// integer `1`; every other block carries a 64-character hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PreviousHash {
    /// Sentinel used by the genesis block
    Genesis,
    /// Lowercase hex digest of the preceding block
    Digest(String),
}

impl PreviousHash {
    /// Check whether this link points at the block with the given digest
    pub fn matches(&self, digest: &str) -> bool {
        match self {
            PreviousHash::Genesis => false,
            PreviousHash::Digest(hash) => hash == digest,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, PreviousHash::Genesis)
    }
}

impl fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PreviousHash::Genesis => write!(f, "{}", GENESIS_MARKER),
            PreviousHash::Digest(hash) => write!(f, "{}", hash),
        }
    }
}

impl From<String> for PreviousHash {
    fn from(hash: String) -> Self {
        PreviousHash::Digest(hash)
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PreviousHash::Genesis => serializer.serialize_u64(GENESIS_MARKER),
            PreviousHash::Digest(hash) => serializer.serialize_str(hash),
        }
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Marker(u64),
            Digest(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Marker(GENESIS_MARKER) => Ok(PreviousHash::Genesis),
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "unexpected previous_hash marker: {}",
                other
            ))),
            Raw::Digest(hash) => Ok(PreviousHash::Digest(hash)),
        }
    }
}

/// Block creation time in Unix seconds.
///
/// Keeps the number form it arrived in: a peer that stamps whole seconds as
/// a JSON integer must hash to the same digest here as on its own side, so an
/// integer is never widened into `1700000000.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Whole seconds written as an integer
    Whole(i64),
    /// Fractional seconds
    Seconds(f64),
}

impl Timestamp {
    pub fn as_secs_f64(&self) -> f64 {
        match *self {
            Timestamp::Whole(secs) => secs as f64,
            Timestamp::Seconds(secs) => secs,
        }
    }
}

impl From<f64> for Timestamp {
    fn from(secs: f64) -> Self {
        Timestamp::Seconds(secs)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp::Whole(secs)
    }
}

/// Current time as floating-point Unix seconds
pub fn now_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}
