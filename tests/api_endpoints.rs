//! Integration tests for the node's REST routes

use axum_test::TestServer;
use proof_ledger::api::router;
use proof_ledger::{Node, NodeConfig};
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server(difficulty: usize) -> TestServer {
    let config = NodeConfig {
        difficulty,
        node_id: Some("api-node".to_string()),
        ..NodeConfig::default()
    };
    let node = Arc::new(Node::new(&config));
    TestServer::new(router(node)).expect("Failed to create test server")
}

#[tokio::test]
async fn test_fresh_chain() {
    let server = test_server(2);

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["proof"], 100);
    assert_eq!(json["chain"][0]["previous_hash"], 1);
    assert!(json["chain"][0]["transactions"].as_array().unwrap().is_empty());
    assert!(json["chain"][0]["timestamp"].is_f64());
}

#[tokio::test]
async fn test_submit_and_mine() {
    let server = test_server(2);

    let response = server
        .post("/transactions/new")
        .json(&json!({ "sender": "alice", "recipient": "bob", "amount": 5 }))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "Transaction will be added to Block 2");

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New Block Forged");
    assert_eq!(json["index"], 2);
    assert_eq!(json["transactions"][0]["sender"], "alice");
    assert_eq!(json["transactions"][1]["sender"], "0");
    assert_eq!(json["transactions"][1]["recipient"], "api-node");
    assert_eq!(json["previous_hash"].as_str().unwrap().len(), 64);

    let json: Value = server.get("/chain").await.json();
    assert_eq!(json["length"], 2);
}

#[tokio::test]
async fn test_submit_missing_field() {
    let server = test_server(2);

    let response = server
        .post("/transactions/new")
        .json(&json!({ "sender": "alice", "amount": 5 }))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "Missing values");
}

#[tokio::test]
async fn test_register_nodes() {
    let server = test_server(2);

    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["http://127.0.0.1:5001", "127.0.0.1:5001", "127.0.0.1:5002"] }))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "New nodes have been added");
    assert_eq!(json["total_nodes"], json!(["127.0.0.1:5001", "127.0.0.1:5002"]));
}

#[tokio::test]
async fn test_register_nodes_rejects_bad_input() {
    let server = test_server(2);

    let response = server.post("/nodes/register").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["no-port-here"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().starts_with("Invalid address"));
}

#[tokio::test]
async fn test_register_nodes_mixed_list_registers_nothing() {
    let server = test_server(2);

    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["127.0.0.1:5001", "bad"] }))
        .await;
    assert_eq!(response.status_code(), 400);

    // Only the address from the accepted request is known
    let response = server
        .post("/nodes/register")
        .json(&json!({ "nodes": ["127.0.0.1:5002"] }))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["total_nodes"], json!(["127.0.0.1:5002"]));
}

#[tokio::test]
async fn test_resolve_without_peers_is_authoritative() {
    let server = test_server(2);

    let response = server.get("/nodes/resolve").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "Our chain is authoritative");
    assert_eq!(json["chain"].as_array().unwrap().len(), 1);
}
