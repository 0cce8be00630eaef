// CLI commands

use crate::api;
use crate::config::{NodeConfig, DEFAULT_LISTEN_ADDR};
use crate::consensus::{Miner, MiningSignal, DEFAULT_DIFFICULTY};
use crate::network::Node;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "proof-ledger")]
#[command(about = "Proof-of-work ledger node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a node and serve its API
    Serve(ServeArgs),

    /// Search for the proof answering a previous proof
    Proof {
        /// Proof of the previous block
        last_proof: u64,

        /// Leading zero hex digits required
        #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: usize,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Leading zero hex digits required of every proof
    #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Peer to register at startup (repeatable)
    #[arg(short, long = "peer")]
    pub peers: Vec<String>,

    /// Timeout for a single peer fetch, in milliseconds
    #[arg(long, default_value = "5000")]
    pub peer_timeout_ms: u64,

    /// Identifier credited with mining rewards (random if omitted)
    #[arg(long)]
    pub node_id: Option<String>,
}

impl From<ServeArgs> for NodeConfig {
    fn from(args: ServeArgs) -> Self {
        NodeConfig {
            listen: args.listen,
            difficulty: args.difficulty,
            peer_timeout: Duration::from_millis(args.peer_timeout_ms),
            bootstrap_peers: args.peers,
            node_id: args.node_id,
        }
    }
}

/// CLI handler
pub struct CliHandler;

impl CliHandler {
    /// Handle CLI command
    pub async fn handle(cli: Cli) -> Result<(), String> {
        match cli.command {
            Commands::Serve(args) => Self::serve(args.into()).await,
            Commands::Proof {
                last_proof,
                difficulty,
            } => Self::proof(last_proof, difficulty),
        }
    }

    /// Run a node until ctrl-c
    async fn serve(config: NodeConfig) -> Result<(), String> {
        let node = Arc::new(Node::new(&config));

        node.register_peers(&config.bootstrap_peers)
            .await
            .map_err(|e| e.to_string())?;

        let listener = tokio::net::TcpListener::bind(config.listen)
            .await
            .map_err(|e| format!("Failed to bind: {}", e))?;

        log::info!(
            "Node {} listening on {} (difficulty {})",
            node.id(),
            config.listen,
            config.difficulty
        );

        let shutdown_node = Arc::clone(&node);
        axum::serve(listener, api::router(node))
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for ctrl-c: {}", e);
                }
                shutdown_node.shutdown();
            })
            .await
            .map_err(|e| format!("Server error: {}", e))
    }

    /// Run the proof search offline and print the result
    fn proof(last_proof: u64, difficulty: usize) -> Result<(), String> {
        println!("Searching proof for {} at difficulty {}...\n", last_proof, difficulty);

        let miner = Miner::new(difficulty);
        let result = miner
            .find_proof_until(last_proof, &MiningSignal::new())
            .ok_or("Proof search cancelled")?;

        println!("✓ Proof found!\n");
        println!("Proof: {}", result.proof);
        println!("Attempts: {}", result.attempts);
        println!("Duration: {:?}", result.duration);
        println!("Hash rate: {:.2} H/s", result.hash_rate());

        Ok(())
    }
}
