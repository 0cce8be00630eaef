// Chain of blocks and the pool of pending transactions

use crate::core::{now_timestamp, Block, PreviousHash, Transaction};

/// The ordered sequence of blocks held by one node, together with the
/// transactions waiting for the next block.
///
/// The chain is never empty: it is created with its genesis block and only
/// ever grows by one block at a time or is replaced wholesale.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Blockchain {
    /// Create a chain holding a freshly stamped genesis block
    pub fn new() -> Self {
        Self::with_genesis(Block::genesis(now_timestamp()))
    }

    /// Create a chain starting from the given genesis block
    pub fn with_genesis(genesis: Block) -> Self {
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
        }
    }

    /// All blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// False for every chain built through this type
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Most recent block
    ///
    /// Panics if the chain is empty, which means internal state is corrupt.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain invariant violated: no genesis block")
    }

    /// Transactions waiting for the next block
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Queue a transaction for the next block.
    /// Returns the index of the block expected to include it.
    pub fn submit(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        self.chain.len() as u64 + 1
    }

    /// Seal the pending transactions into a new block and append it.
    ///
    /// `previous_hash` defaults to the digest of the current last block.
    pub fn append_block(&mut self, proof: u64, previous_hash: Option<PreviousHash>) -> &Block {
        let previous_hash =
            previous_hash.unwrap_or_else(|| PreviousHash::Digest(self.last_block().hash()));

        let block = Block::new(
            self.chain.len() as u64 + 1,
            now_timestamp(),
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );

        log::info!(
            "Appended block {} with {} transactions",
            block.index,
            block.transactions.len()
        );

        self.chain.push(block);
        self.last_block()
    }

    /// Replace the whole chain. Pending transactions are kept.
    pub fn replace(&mut self, chain: Vec<Block>) -> Result<(), String> {
        if chain.is_empty() {
            return Err("Refusing to replace chain with an empty chain".to_string());
        }

        log::info!("Replacing chain of {} blocks with {} blocks", self.chain.len(), chain.len());
        self.chain = chain;
        Ok(())
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_chain() {
        let chain = Blockchain::new();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());

        let genesis = chain.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, 100);
        assert_eq!(genesis.previous_hash, PreviousHash::Genesis);
        assert!(chain.pending_transactions().is_empty());
    }

    #[test]
    fn test_submit_predicts_next_index() {
        let mut chain = Blockchain::new();
        assert_eq!(chain.submit(Transaction::new("a", "b", 1)), 2);
        assert_eq!(chain.submit(Transaction::new("b", "c", 2)), 2);

        chain.append_block(35293, None);
        assert_eq!(chain.submit(Transaction::new("c", "d", 3)), 3);
    }

    #[test]
    fn test_append_drains_pool() {
        let mut chain = Blockchain::new();
        chain.submit(Transaction::new("a", "b", 1));
        chain.submit(Transaction::new("b", "c", 2));
        let expected = chain.pending_transactions().to_vec();

        let block = chain.append_block(35293, None).clone();

        assert!(chain.pending_transactions().is_empty());
        assert_eq!(block.transactions, expected);
        assert_eq!(block.index, 2);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_append_links_previous_hash() {
        let mut chain = Blockchain::new();
        let genesis_hash = chain.last_block().hash();

        let block = chain.append_block(35293, None);
        assert!(block.previous_hash.matches(&genesis_hash));
    }

    #[test]
    fn test_append_with_explicit_previous_hash() {
        let mut chain = Blockchain::new();
        let explicit = PreviousHash::Digest("f".repeat(64));

        let block = chain.append_block(7, Some(explicit.clone()));
        assert_eq!(block.previous_hash, explicit);
        assert_eq!(block.proof, 7);
    }

    #[test]
    fn test_replace_rejects_empty() {
        let mut chain = Blockchain::new();
        assert!(chain.replace(Vec::new()).is_err());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_replace_keeps_pending() {
        let mut chain = Blockchain::new();
        chain.submit(Transaction::new("a", "b", 1));

        let other = Blockchain::new();
        let mut blocks = other.blocks().to_vec();
        blocks.push(Block::new(2, 0.0, Vec::new(), 1, PreviousHash::Digest("0".repeat(64))));

        chain.replace(blocks.clone()).unwrap();
        assert_eq!(chain.blocks(), blocks.as_slice());
        assert_eq!(chain.pending_transactions().len(), 1);
    }

    #[test]
    #[should_panic(expected = "chain invariant violated")]
    fn test_last_block_on_empty_chain_panics() {
        let chain = Blockchain {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        chain.last_block();
    }
}
