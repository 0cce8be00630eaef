// Hashing utilities for the ledger

use crate::core::{Block, CanonicalEncode};
use sha2::{Digest, Sha256};

/// Single SHA256 hash
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// SHA256 rendered as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_hash(data))
}

/// Digest of a block's canonical encoding
pub fn hash_block(block: &Block) -> String {
    sha256_hex(block.to_canonical_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PreviousHash, Transaction, DIGEST_HEX_LEN};

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex(b"10035293");
        assert_eq!(
            hash,
            "0000c415de5ceea33c02daa85a1c218ecca1b1c9e9864ed34d183597844de8e2"
        );
    }

    #[test]
    fn test_genesis_digest() {
        let genesis = Block::genesis(1700000000.0);
        assert_eq!(
            hash_block(&genesis),
            "e9e15af60d7465a1d85491783968224a0d97754ffb0df70b8237aec809d9076d"
        );
    }

    #[test]
    fn test_block_digest_with_transactions() {
        let block = Block::new(
            2,
            1506280650.770839,
            vec![
                Transaction::new("a", "b", 5),
                Transaction::new("0", "n\u{e9}\"x", 1),
            ],
            35293,
            PreviousHash::Digest("ab".repeat(32)),
        );

        let hash = hash_block(&block);
        assert_eq!(hash.len(), DIGEST_HEX_LEN);
        assert_eq!(
            hash,
            "00cdf62226d814f85bda5cc20d3b6c39f8018c6f252d7f776071f1224412f071"
        );
    }

    #[test]
    fn test_construction_order_irrelevant() {
        let mut first = Block::genesis(1700000000.0);
        first.transactions.push(Transaction::new("a", "b", 5));

        // Same logical content, populated in a different order
        let mut second = Block::new(1, 0.0, Vec::new(), 0, PreviousHash::Genesis);
        second.transactions = vec![Transaction {
            amount: 5,
            recipient: "b".to_string(),
            sender: "a".to_string(),
        }];
        second.proof = 100;
        second.timestamp = 1700000000.0.into();

        assert_eq!(hash_block(&first), hash_block(&second));
    }

    #[test]
    fn test_digest_changes_with_content() {
        let genesis = Block::genesis(1700000000.0);
        let mut altered = genesis.clone();
        altered.proof += 1;

        assert_ne!(hash_block(&genesis), hash_block(&altered));
    }
}
