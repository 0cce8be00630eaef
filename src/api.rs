// REST API exposing node operations

use crate::core::{Block, PreviousHash, Transaction};
use crate::network::{ChainFetcher, ChainResponse, Node, NodeError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the router for a node
pub fn router<F: ChainFetcher>(node: Arc<Node<F>>) -> Router {
    Router::new()
        .route("/mine", get(mine::<F>))
        .route("/transactions/new", post(new_transaction::<F>))
        .route("/chain", get(full_chain::<F>))
        .route("/nodes/register", post(register_nodes::<F>))
        .route("/nodes/resolve", get(resolve::<F>))
        .with_state(node)
}

/// Error body returned for failed requests
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<NodeError> for ApiError {
    fn from(err: NodeError) -> Self {
        let status = match err {
            NodeError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            NodeError::MiningAborted | NodeError::StaleProof => StatusCode::CONFLICT,
            NodeError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            NodeError::MiningTask(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct MinedBlock {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: PreviousHash,
}

async fn mine<F: ChainFetcher>(State(node): State<Arc<Node<F>>>) -> Result<Json<MinedBlock>, ApiError> {
    let block = node.mine().await?;

    Ok(Json(MinedBlock {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

/// Fields are optional so a missing one is reported as 400 with a message
#[derive(Debug, Deserialize)]
struct NewTransaction {
    sender: Option<String>,
    recipient: Option<String>,
    amount: Option<u64>,
}

async fn new_transaction<F: ChainFetcher>(
    State(node): State<Arc<Node<F>>>,
    Json(body): Json<NewTransaction>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(sender), Some(recipient), Some(amount)) = (body.sender, body.recipient, body.amount)
    else {
        return Err(ApiError::bad_request("Missing values"));
    };

    let index = node.submit_transaction(&sender, &recipient, amount).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Transaction will be added to Block {}", index) })),
    ))
}

async fn full_chain<F: ChainFetcher>(State(node): State<Arc<Node<F>>>) -> Json<ChainResponse> {
    Json(ChainResponse::new(node.chain().await))
}

#[derive(Debug, Deserialize)]
struct RegisterNodes {
    nodes: Option<Vec<String>>,
}

async fn register_nodes<F: ChainFetcher>(
    State(node): State<Arc<Node<F>>>,
    Json(body): Json<RegisterNodes>,
) -> Result<impl IntoResponse, ApiError> {
    let nodes = match body.nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => return Err(ApiError::bad_request("Please supply a valid list of nodes")),
    };

    node.register_peers(&nodes).await?;

    let total_nodes: Vec<String> = node.peers().await.iter().map(|p| p.to_string()).collect();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "New nodes have been added",
            "total_nodes": total_nodes,
        })),
    ))
}

async fn resolve<F: ChainFetcher>(State(node): State<Arc<Node<F>>>) -> Json<serde_json::Value> {
    let resolution = node.resolve_conflicts().await;
    let chain: &[Block] = &resolution.chain;

    if resolution.replaced {
        Json(json!({ "message": "Our chain was replaced", "new_chain": chain }))
    } else {
        Json(json!({ "message": "Our chain is authoritative", "chain": chain }))
    }
}
