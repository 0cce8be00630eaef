// Retrieval of peer chains

use crate::core::Block;
use crate::network::PeerAddress;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Body served by a node's chain endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: u64,
}

impl ChainResponse {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len() as u64;
        Self { chain, length }
    }

    /// Decode a response body, rejecting a length that disagrees with the chain
    pub fn from_slice(body: &[u8]) -> Result<Self, PeerError> {
        let response: Self =
            serde_json::from_slice(body).map_err(|e| PeerError::Malformed(e.to_string()))?;
        response.check_length()?;
        Ok(response)
    }

    pub fn check_length(&self) -> Result<(), PeerError> {
        if self.length != self.chain.len() as u64 {
            return Err(PeerError::LengthMismatch {
                reported: self.length,
                actual: self.chain.len(),
            });
        }
        Ok(())
    }
}

/// Reasons a peer's chain could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerError {
    /// Connection or protocol failure
    Transport(String),
    /// Peer answered with a non-success status
    Status(u16),
    /// Body was not a chain response
    Malformed(String),
    /// Reported length disagrees with the chain sent
    LengthMismatch { reported: u64, actual: usize },
    /// Peer didn't answer in time
    Timeout,
}

impl std::fmt::Display for PeerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PeerError::Transport(msg) => write!(f, "Transport error: {}", msg),
            PeerError::Status(code) => write!(f, "Unexpected status {}", code),
            PeerError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            PeerError::LengthMismatch { reported, actual } => write!(
                f,
                "Reported length {} but sent {} blocks",
                reported, actual
            ),
            PeerError::Timeout => write!(f, "Timed out"),
        }
    }
}

impl std::error::Error for PeerError {}

/// Source of peer chains used during conflict resolution
pub trait ChainFetcher: Send + Sync + 'static {
    fn fetch_chain(
        &self,
        peer: &PeerAddress,
    ) -> impl Future<Output = Result<ChainResponse, PeerError>> + Send;
}

/// Fetches `GET /chain` from peers over HTTP/1.1
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: hyper::Client<hyper::client::HttpConnector>,
}

impl HttpChainFetcher {
    pub fn new() -> Self {
        Self {
            client: hyper::Client::new(),
        }
    }
}

impl Default for HttpChainFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &PeerAddress) -> Result<ChainResponse, PeerError> {
        let uri: hyper::Uri = format!("http://{}/chain", peer)
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| PeerError::Transport(e.to_string()))?;

        let response = self
            .client
            .get(uri)
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::Status(status.as_u16()));
        }

        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;

        ChainResponse::from_slice(&body)
    }
}
