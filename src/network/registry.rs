// Registry of known peers

use std::collections::BTreeSet;
use std::fmt;

/// Port assumed for `http://` addresses that don't name one
const DEFAULT_HTTP_PORT: u16 = 80;

/// Normalized network location of a peer (`host:port`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerAddress {
    host: String,
    port: u16,
}

impl PeerAddress {
    /// Normalize a user-supplied address.
    ///
    /// Accepts `host:port`, `http://host:port/any/path` and similar forms:
    /// the scheme, credentials, path, query and fragment are dropped and the
    /// host is lowercased. A port is required unless the scheme is `http`.
    pub fn parse(address: &str) -> Result<Self, String> {
        let trimmed = address.trim();

        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.to_ascii_lowercase()), rest),
            None => (None, trimmed),
        };

        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let authority = match authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => authority,
        };

        let (host, port) = match split_host_port(authority) {
            (host, Some(port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port in address: {}", address))?;
                (host, port)
            }
            (host, None) if scheme.as_deref() == Some("http") => (host, DEFAULT_HTTP_PORT),
            (_, None) => return Err(format!("Missing port in address: {}", address)),
        };

        if host.is_empty() {
            return Err(format!("Missing host in address: {}", address));
        }
        // IPv6 literals must be bracketed, anything else with ':' left is a second port
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            return Err(format!("Ambiguous host in address: {}", address));
        }

        Ok(Self {
            host: host.to_ascii_lowercase(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Split `host:port`, keeping bracketed IPv6 hosts intact
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => {
                let host = &authority[..=end];
                let port = authority[end + 1..].strip_prefix(':');
                (host, port)
            }
            None => (authority, None),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Set of peers this node reconciles with
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    peers: BTreeSet<PeerAddress>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Registering an address twice keeps a single entry.
    /// Returns the normalized address.
    pub fn register(&mut self, address: &str) -> Result<PeerAddress, String> {
        let peer = PeerAddress::parse(address)?;
        self.insert(peer.clone());
        Ok(peer)
    }

    /// Register every address or none of them.
    /// Returns the normalized addresses in input order.
    pub fn register_all<S: AsRef<str>>(&mut self, addresses: &[S]) -> Result<Vec<PeerAddress>, String> {
        let peers = addresses
            .iter()
            .map(|address| PeerAddress::parse(address.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for peer in &peers {
            self.insert(peer.clone());
        }

        Ok(peers)
    }

    fn insert(&mut self, peer: PeerAddress) {
        if self.peers.contains(&peer) {
            log::debug!("Peer {} already registered", peer);
        } else {
            log::info!("Registered peer {}", peer);
            self.peers.insert(peer);
        }
    }

    pub fn contains(&self, peer: &PeerAddress) -> bool {
        self.peers.contains(peer)
    }

    /// Snapshot of all peers in a stable order
    pub fn peers(&self) -> Vec<PeerAddress> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
