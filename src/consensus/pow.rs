// Proof of Work implementation

use crate::core::{sha256_hash, DIGEST_HEX_LEN};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Leading zero hex digits required by default
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Cancellation flag shared between a running proof search and whoever may
/// need to abort it. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct MiningSignal {
    cancelled: Arc<AtomicBool>,
}

impl MiningSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this signal to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Proof of Work miner
///
/// A proof `p` answers the previous proof `q` when SHA256 of the decimal
/// string `"{q}{p}"` starts with `difficulty` zero hex digits.
#[derive(Debug, Clone, Copy)]
pub struct Miner {
    difficulty: usize,
}

impl Miner {
    /// Create a new miner with fixed difficulty
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty: difficulty.min(DIGEST_HEX_LEN),
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Verify that `proof` answers `last_proof`
    pub fn valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{}{}", last_proof, proof);
        let hash = sha256_hash(guess.as_bytes());
        has_leading_zero_digits(&hash, self.difficulty)
    }

    /// Find the smallest proof answering `last_proof`
    pub fn find_proof(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.valid_proof(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    /// Same search as `find_proof`, polling `signal` before every attempt.
    /// Returns `None` once the signal is cancelled.
    pub fn find_proof_until(&self, last_proof: u64, signal: &MiningSignal) -> Option<MiningResult> {
        let start_time = Instant::now();
        let mut attempts = 0u64;
        let mut proof = 0u64;

        loop {
            if signal.is_cancelled() {
                log::debug!(
                    "Mining on proof {} cancelled after {} attempts",
                    last_proof,
                    attempts
                );
                return None;
            }

            attempts += 1;
            if self.valid_proof(last_proof, proof) {
                return Some(MiningResult {
                    proof,
                    attempts,
                    duration: start_time.elapsed(),
                });
            }

            // Progress indicator every 100k attempts
            if attempts % 100_000 == 0 {
                let elapsed = start_time.elapsed();
                log::debug!("Mining attempts: {} ({:.1} KH/s)",
                    attempts,
                    attempts as f64 / elapsed.as_secs_f64() / 1000.0
                );
            }

            proof += 1;
        }
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

/// Check that the hex rendering of `hash` starts with `count` zero digits
#[inline]
fn has_leading_zero_digits(hash: &[u8], count: usize) -> bool {
    let full_bytes = count / 2;
    let needs_nibble = count % 2 == 1;

    if hash.len() < full_bytes + usize::from(needs_nibble) {
        return false;
    }

    hash[..full_bytes].iter().all(|byte| *byte == 0)
        && (!needs_nibble || hash[full_bytes] >> 4 == 0)
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The proof that was found
    pub proof: u64,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sha256_hex;

    #[test]
    fn test_find_proof_golden() {
        let miner = Miner::new(4);
        assert_eq!(miner.find_proof(100), 35293);
        assert_eq!(miner.find_proof(35293), 35089);
    }

    #[test]
    fn test_valid_proof_matches_hex_prefix() {
        let miner = Miner::new(4);
        assert!(miner.valid_proof(100, 35293));
        assert!(sha256_hex(b"10035293").starts_with("0000"));

        assert!(!miner.valid_proof(100, 35292));
        assert!(!sha256_hex(b"10035292").starts_with("0000"));
    }

    #[test]
    fn test_find_proof_is_smallest() {
        let miner = Miner::new(4);
        let proof = miner.find_proof(100);
        assert!((0..proof).all(|p| !miner.valid_proof(100, p)));
    }

    #[test]
    fn test_odd_difficulty() {
        let miner = Miner::new(3);
        let proof = miner.find_proof(7);
        let hash = sha256_hex(format!("7{}", proof).as_bytes());
        assert!(hash.starts_with("000"));
    }

    #[test]
    fn test_zero_difficulty_accepts_anything() {
        let miner = Miner::new(0);
        assert!(miner.valid_proof(1, 1));
        assert_eq!(miner.find_proof(12345), 0);
    }

    #[test]
    fn test_leading_zero_digits() {
        assert!(has_leading_zero_digits(&[0x00, 0x0f, 0xff], 3));
        assert!(!has_leading_zero_digits(&[0x00, 0x10, 0xff], 3));
        assert!(has_leading_zero_digits(&[0x00, 0x00], 4));
        assert!(!has_leading_zero_digits(&[0x00], 4));
    }

    #[test]
    fn test_find_proof_until_matches_find_proof() {
        let miner = Miner::new(3);
        let signal = MiningSignal::new();

        let result = miner.find_proof_until(100, &signal).unwrap();
        assert_eq!(result.proof, miner.find_proof(100));
        assert_eq!(result.attempts, result.proof + 1);
    }

    #[test]
    fn test_cancelled_search_stops() {
        let miner = Miner::new(DIGEST_HEX_LEN);
        let signal = MiningSignal::new();
        signal.cancel();

        assert!(miner.find_proof_until(100, &signal).is_none());
    }

    #[test]
    fn test_cancel_from_another_thread() {
        // Impossible difficulty: only cancellation can end the search
        let miner = Miner::new(DIGEST_HEX_LEN);
        let signal = MiningSignal::new();
        let worker_signal = signal.clone();

        let handle = std::thread::spawn(move || miner.find_proof_until(1, &worker_signal));
        std::thread::sleep(Duration::from_millis(20));
        signal.cancel();

        assert!(handle.join().unwrap().is_none());
    }

    #[test]
    fn test_difficulty_clamped() {
        assert_eq!(Miner::new(1000).difficulty(), DIGEST_HEX_LEN);
        assert_eq!(Miner::default().difficulty(), DEFAULT_DIFFICULTY);
    }
}
