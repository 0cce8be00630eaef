// Transaction data structures

use serde::{Deserialize, Serialize};

/// Sender recorded on mining reward transactions
pub const REWARD_SENDER: &str = "0";

/// Amount paid to the node that seals a block
pub const MINING_REWARD: u64 = 1;

/// Value transfer waiting in the pool or recorded in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier of the paying party
    pub sender: String,
    /// Identifier of the receiving party
    pub recipient: String,
    /// Amount transferred
    pub amount: u64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Reward paid to the miner of the next block
    pub fn reward(miner_id: &str) -> Self {
        Self::new(REWARD_SENDER, miner_id, MINING_REWARD)
    }

    /// Check if this is a mining reward
    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_transaction() {
        let tx = Transaction::reward("node-a");
        assert!(tx.is_reward());
        assert_eq!(tx.recipient, "node-a");
        assert_eq!(tx.amount, MINING_REWARD);
    }

    #[test]
    fn test_wire_field_names() {
        let tx = Transaction::new("alice", "bob", 5);
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["recipient"], "bob");
        assert_eq!(value["amount"], 5);
        assert!(!tx.is_reward());
    }
}
