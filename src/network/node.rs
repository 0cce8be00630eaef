// Ledger node - owns the chain and reconciles it with peers

use crate::config::NodeConfig;
use crate::consensus::{ChainValidator, Miner, MiningResult, MiningSignal};
use crate::core::{Block, Blockchain, PreviousHash, Transaction};
use crate::network::{ChainFetcher, ConsensusResolver, HttpChainFetcher, NodeRegistry, PeerAddress};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// Errors surfaced by node operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Peer address could not be normalized
    InvalidAddress(String),
    /// Proof search was cancelled before it finished
    MiningAborted,
    /// Chain tip changed while the proof was being searched
    StaleProof,
    /// Node is shutting down and accepts no new mining work
    ShuttingDown,
    /// Mining worker failed to run to completion
    MiningTask(String),
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NodeError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            NodeError::MiningAborted => write!(f, "Mining aborted"),
            NodeError::StaleProof => write!(f, "Chain changed while mining; proof discarded"),
            NodeError::ShuttingDown => write!(f, "Node is shutting down"),
            NodeError::MiningTask(msg) => write!(f, "Mining task failed: {}", msg),
        }
    }
}

impl std::error::Error for NodeError {}

/// Result of a conflict resolution round
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Whether a peer's chain replaced ours
    pub replaced: bool,
    /// The node's chain after resolution
    pub chain: Vec<Block>,
}

/// Ledger node
pub struct Node<F = HttpChainFetcher> {
    /// Identifier credited with mining rewards
    id: String,
    /// Chain and pending transactions, one writer at a time
    blockchain: RwLock<Blockchain>,
    /// Known peers
    registry: RwLock<NodeRegistry>,
    miner: Miner,
    resolver: ConsensusResolver<F>,
    /// Signal shared by every proof search started since the last chain change
    mining: Mutex<MiningSignal>,
    shutting_down: AtomicBool,
}

impl Node<HttpChainFetcher> {
    /// Create a new node that fetches peer chains over HTTP
    pub fn new(config: &NodeConfig) -> Self {
        Self::with_fetcher(config, HttpChainFetcher::new())
    }
}

impl<F: ChainFetcher> Node<F> {
    /// Create a new node with a custom chain fetcher
    pub fn with_fetcher(config: &NodeConfig, fetcher: F) -> Self {
        let miner = Miner::new(config.difficulty);
        let id = config.node_id.clone().unwrap_or_else(NodeConfig::random_node_id);

        Self {
            id,
            blockchain: RwLock::new(Blockchain::new()),
            registry: RwLock::new(NodeRegistry::new()),
            miner,
            resolver: ConsensusResolver::new(fetcher, ChainValidator::new(miner), config.peer_timeout),
            mining: Mutex::new(MiningSignal::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn miner(&self) -> Miner {
        self.miner
    }

    /// Mine the next block.
    ///
    /// The proof search runs on a blocking worker and is abandoned when the
    /// chain is replaced or the node shuts down. A proof found against a tip
    /// that is no longer current is discarded and the pool is left untouched.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(NodeError::ShuttingDown);
        }
        let signal = self.current_signal();
        let (last_proof, last_hash) = self.mining_tip().await;

        let miner = self.miner;
        let result = tokio::task::spawn_blocking(move || miner.find_proof_until(last_proof, &signal))
            .await
            .map_err(|e| NodeError::MiningTask(e.to_string()))?
            .ok_or(NodeError::MiningAborted)?;

        self.seal(last_hash, result).await
    }

    /// Proof and digest of the block the next search builds on
    async fn mining_tip(&self) -> (u64, String) {
        let chain = self.blockchain.read().await;
        let last = chain.last_block();
        (last.proof, last.hash())
    }

    /// Append the reward and pool as a new block on `last_hash`, provided it
    /// is still the tip
    async fn seal(&self, last_hash: String, result: MiningResult) -> Result<Block, NodeError> {
        let mut chain = self.blockchain.write().await;
        if chain.last_block().hash() != last_hash {
            log::info!("Discarding proof {}: chain tip changed during search", result.proof);
            return Err(NodeError::StaleProof);
        }

        chain.submit(Transaction::reward(&self.id));
        let block = chain
            .append_block(result.proof, Some(PreviousHash::Digest(last_hash)))
            .clone();

        log::info!(
            "Mined block {} with proof {} after {} attempts in {:?}",
            block.index,
            block.proof,
            result.attempts,
            result.duration
        );

        Ok(block)
    }

    /// Queue a transaction; returns the index of the block expected to hold it
    pub async fn submit_transaction(&self, sender: &str, recipient: &str, amount: u64) -> u64 {
        self.blockchain
            .write()
            .await
            .submit(Transaction::new(sender, recipient, amount))
    }

    /// Snapshot of the full chain
    pub async fn chain(&self) -> Vec<Block> {
        self.blockchain.read().await.blocks().to_vec()
    }

    /// Snapshot of pending transactions
    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.blockchain.read().await.pending_transactions().to_vec()
    }

    /// Register a peer, returning its normalized address
    pub async fn register_peer(&self, address: &str) -> Result<PeerAddress, NodeError> {
        self.registry
            .write()
            .await
            .register(address)
            .map_err(NodeError::InvalidAddress)
    }

    /// Register a batch of peers. If any address is invalid nothing is registered.
    pub async fn register_peers(&self, addresses: &[String]) -> Result<Vec<PeerAddress>, NodeError> {
        self.registry
            .write()
            .await
            .register_all(addresses)
            .map_err(NodeError::InvalidAddress)
    }

    /// Get peer list
    pub async fn peers(&self) -> Vec<PeerAddress> {
        self.registry.read().await.peers()
    }

    /// Replace the local chain with the longest valid peer chain, if one is
    /// strictly longer. The final length comparison and the swap happen under
    /// the chain's write lock, against the chain as it is at that moment.
    pub async fn resolve_conflicts(&self) -> Resolution {
        let peers = self.peers().await;
        let local_len = self.blockchain.read().await.len();

        let candidate = self.resolver.resolve_conflicts(local_len, &peers).await;

        let mut chain = self.blockchain.write().await;
        let replaced = match candidate {
            Some(candidate) if candidate.len() > chain.len() => match chain.replace(candidate) {
                Ok(()) => {
                    self.restart_mining();
                    true
                }
                Err(e) => {
                    log::error!("Failed to replace chain: {}", e);
                    false
                }
            },
            Some(candidate) => {
                log::info!(
                    "Local chain grew to {} blocks during resolution; keeping it over {}",
                    chain.len(),
                    candidate.len()
                );
                false
            }
            None => false,
        };

        Resolution {
            replaced,
            chain: chain.blocks().to_vec(),
        }
    }

    /// Cancel in-flight mining and refuse new mining work
    pub fn shutdown(&self) {
        log::info!("Node {} shutting down", self.id);
        self.shutting_down.store(true, Ordering::SeqCst);
        self.lock_mining().cancel();
    }

    fn current_signal(&self) -> MiningSignal {
        self.lock_mining().clone()
    }

    /// Abort every search started against the old chain
    fn restart_mining(&self) {
        let mut signal = self.lock_mining();
        signal.cancel();
        if !self.shutting_down.load(Ordering::SeqCst) {
            *signal = MiningSignal::new();
        }
    }

    fn lock_mining(&self) -> std::sync::MutexGuard<'_, MiningSignal> {
        self.mining.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
