//! Solo Consensus Module
//!
//! This module implements single-writer ordering: exactly one process orders
//! transactions for a chain, so no agreement protocol is involved.
//! - Consenter: binds the configured batch timeout to each activated chain
//! - Chain: the per-ledger scheduling loop (admission, batch timer, shutdown)
//! - ConsenterSupport: the collaborator bundle (block cutter + writer) a chain drives

mod chain;
mod consenter;
mod error;
mod halt;


pub use chain::Chain;
pub use consenter::{ChainSupport, Consenter, ConsenterSupport};
pub use error::ConsensusError;
