// Block data structures

use crate::core::{hash_block, PreviousHash, Timestamp, Transaction, GENESIS_PROOF};
use serde::{Deserialize, Serialize};

/// Block - an immutable record linked to its predecessor by hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 1 for genesis
    pub index: u64,
    /// Creation time (Unix seconds)
    pub timestamp: Timestamp,
    /// Transactions drained from the pool when the block was sealed
    pub transactions: Vec<Transaction>,
    /// Proof-of-work answer for the previous block's proof
    pub proof: u64,
    /// Digest of the previous block
    pub previous_hash: PreviousHash,
}

impl Block {
    /// Create a new block
    pub fn new(
        index: u64,
        timestamp: impl Into<Timestamp>,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: PreviousHash,
    ) -> Self {
        Self {
            index,
            timestamp: timestamp.into(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Create the genesis block
    pub fn genesis(timestamp: impl Into<Timestamp>) -> Self {
        Self::new(1, timestamp, Vec::new(), GENESIS_PROOF, PreviousHash::Genesis)
    }

    /// Get the block hash
    pub fn hash(&self) -> String {
        hash_block(self)
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.previous_hash.is_genesis()
    }
}
