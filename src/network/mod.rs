// Peer networking and consensus resolution

mod registry;
mod client;
mod resolver;
mod node;

pub use registry::{NodeRegistry, PeerAddress};
pub use client::{ChainFetcher, ChainResponse, HttpChainFetcher, PeerError};
pub use resolver::{ConsensusResolver, PeerFetch, DEFAULT_PEER_TIMEOUT};
pub use node::{Node, NodeError, Resolution};
