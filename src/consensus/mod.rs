// Consensus and validation logic

pub mod pow;
pub mod validation;

pub use pow::{Miner, MiningResult, MiningSignal, DEFAULT_DIFFICULTY};
pub use validation::{ChainValidator, ValidationError};
