//! Single-writer transaction ordering for a permissioned ledger.
//! Envelopes submitted to a chain are grouped into batches by a block cutter,
//! either when a batch fills up or when the batch timeout expires, and each
//! batch is handed to a writer as the next block.

pub mod types; // Envelopes, batches and blocks.
pub mod consensus; // Solo consenter and the per-chain scheduling loop.
pub mod blockcutter; // Batch cutting contract and the count-based cutter.
pub mod ledger; // Block writer contract and the in-memory ledger.
pub mod config; // Defines and loads orderer configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use consensus::{Chain, Consenter};
