// Chain validation logic

use crate::consensus::pow::Miner;
use crate::core::Block;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Chain has no blocks at all
    EmptyChain,
    /// Block's previous_hash doesn't match the digest of its predecessor
    BrokenLink { index: u64 },
    /// Block's proof doesn't answer its predecessor's proof
    InvalidProofOfWork { index: u64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::EmptyChain => write!(f, "Chain has no blocks"),
            ValidationError::BrokenLink { index } => {
                write!(f, "Block {} does not link to its predecessor", index)
            }
            ValidationError::InvalidProofOfWork { index } => {
                write!(f, "Invalid proof of work in block {}", index)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Whole-chain validator
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    /// PoW miner for verification
    miner: Miner,
}

impl ChainValidator {
    /// Create a validator checking proofs with the given miner's difficulty
    pub fn new(miner: Miner) -> Self {
        Self { miner }
    }

    /// Validate every adjacent pair of blocks, stopping at the first failure.
    /// The first block is trusted as the chain's genesis.
    pub fn validate_chain(&self, chain: &[Block]) -> Result<(), ValidationError> {
        if chain.is_empty() {
            return Err(ValidationError::EmptyChain);
        }

        for pair in chain.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);

            if !cur.previous_hash.matches(&prev.hash()) {
                return Err(ValidationError::BrokenLink { index: cur.index });
            }

            if !self.miner.valid_proof(prev.proof, cur.proof) {
                return Err(ValidationError::InvalidProofOfWork { index: cur.index });
            }
        }

        Ok(())
    }

    pub fn valid_chain(&self, chain: &[Block]) -> bool {
        self.validate_chain(chain).is_ok()
    }
}
