// Proof-of-work ledger
// Append-only transaction ledger replicated across nodes; longest valid chain wins

pub mod core;
pub mod consensus;
pub mod network;
pub mod config;
pub mod api;
pub mod cli;

// Re-exports for convenience
pub use crate::core::{Block, Blockchain, PreviousHash, Transaction};
pub use consensus::{ChainValidator, Miner, MiningResult, MiningSignal, ValidationError};
pub use network::{
    ChainFetcher, ChainResponse, ConsensusResolver, HttpChainFetcher, Node, NodeError,
    NodeRegistry, PeerAddress, PeerError, Resolution,
};
pub use config::NodeConfig;
pub use cli::{Cli, CliHandler};
