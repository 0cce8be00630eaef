// Node configuration

use crate::consensus::DEFAULT_DIFFICULTY;
use crate::network::DEFAULT_PEER_TIMEOUT;
use std::net::SocketAddr;
use std::time::Duration;

/// Default API listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// Settings for one node.
///
/// `difficulty` must be identical on every cooperating node, otherwise they
/// reject each other's chains.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the API listens on
    pub listen: SocketAddr,
    /// Leading zero hex digits required of every proof
    pub difficulty: usize,
    /// Bound on a single peer fetch during conflict resolution
    pub peer_timeout: Duration,
    /// Peers registered at startup
    pub bootstrap_peers: Vec<String>,
    /// Identifier credited with mining rewards; random when unset
    pub node_id: Option<String>,
}

impl NodeConfig {
    /// 32 lowercase hex characters from 16 random bytes
    pub fn random_node_id() -> String {
        hex::encode(rand::random::<[u8; 16]>())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 5000)),
            difficulty: DEFAULT_DIFFICULTY,
            peer_timeout: DEFAULT_PEER_TIMEOUT,
            bootstrap_peers: Vec::new(),
            node_id: None,
        }
    }
}
