// Core ledger data structures

mod types;
mod transaction;
mod block;
mod chain;
mod serialize;
mod hash;

pub use types::*;
pub use transaction::*;
pub use block::*;
pub use chain::*;
pub use serialize::*;
pub use hash::*;
