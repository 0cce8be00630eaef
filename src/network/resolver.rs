// Longest-valid-chain conflict resolution

use crate::consensus::ChainValidator;
use crate::core::Block;
use crate::network::{ChainFetcher, ChainResponse, PeerAddress, PeerError};
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a single peer fetch
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of fetching one peer
pub type PeerFetch = (PeerAddress, Result<ChainResponse, PeerError>);

/// Picks the longest valid chain among the chains peers report.
///
/// Length alone decides between valid chains; there is no weighting by the
/// work a chain embodies.
pub struct ConsensusResolver<F> {
    fetcher: Arc<F>,
    validator: ChainValidator,
    timeout: Duration,
}

impl<F: ChainFetcher> ConsensusResolver<F> {
    pub fn new(fetcher: F, validator: ChainValidator, timeout: Duration) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            validator,
            timeout,
        }
    }

    /// Fetch every peer concurrently, each bounded by the timeout.
    /// Results come back in the order of `peers`.
    pub async fn fetch_all(&self, peers: &[PeerAddress]) -> Vec<PeerFetch> {
        let handles: Vec<_> = peers
            .iter()
            .cloned()
            .map(|peer| {
                let fetcher = Arc::clone(&self.fetcher);
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let result = match tokio::time::timeout(timeout, fetcher.fetch_chain(&peer)).await {
                        Ok(result) => result,
                        Err(_) => Err(PeerError::Timeout),
                    };
                    (peer, result)
                })
            })
            .collect();

        let mut fetched = Vec::with_capacity(handles.len());
        for (peer, handle) in peers.iter().zip(handles) {
            match handle.await {
                Ok(outcome) => fetched.push(outcome),
                Err(e) => fetched.push((
                    peer.clone(),
                    Err(PeerError::Transport(format!("Fetch task failed: {}", e))),
                )),
            }
        }
        fetched
    }

    /// Choose the replacement chain, if any.
    ///
    /// The bar starts at `local_len`; a candidate raises it only when it is
    /// strictly longer than the bar and valid, so the first valid chain of a
    /// given length wins over later ones of the same length.
    pub fn select_chain(&self, local_len: usize, fetched: Vec<PeerFetch>) -> Option<Vec<Block>> {
        let mut best_len = local_len;
        let mut best: Option<Vec<Block>> = None;

        for (peer, result) in fetched {
            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    log::warn!("Skipping peer {}: {}", peer, e);
                    continue;
                }
            };

            if let Err(e) = response.check_length() {
                log::warn!("Skipping peer {}: {}", peer, e);
                continue;
            }

            let length = response.chain.len();
            if length <= best_len {
                log::debug!("Peer {} chain of {} blocks is not longer than {}", peer, length, best_len);
                continue;
            }

            match self.validator.validate_chain(&response.chain) {
                Ok(()) => {
                    log::info!("Peer {} offers a valid chain of {} blocks", peer, length);
                    best_len = length;
                    best = Some(response.chain);
                }
                Err(e) => log::info!("Rejecting chain from peer {}: {}", peer, e),
            }
        }

        best
    }

    /// Query `peers` and return the longest valid chain strictly longer than
    /// `local_len`, or `None` when the local chain stays authoritative.
    pub async fn resolve_conflicts(&self, local_len: usize, peers: &[PeerAddress]) -> Option<Vec<Block>> {
        let fetched = self.fetch_all(peers).await;
        self.select_chain(local_len, fetched)
    }
}
