//! In-memory Ledger Module
//!
//! Appends each batch as the next numbered block. Blocks live behind a shared
//! lock so readers can follow the ledger while the chain's loop writes to it.

use crate::{Batch, Block, BlockSummary};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Block writing contract consumed by the scheduling loop
///
/// The loop does not look at the outcome of `append`; reporting and recovery
/// of write failures belong to the implementation.
pub trait Writer: Send {
    /// Append `batch` as the next block, carrying `metadata` through untouched
    fn append(&mut self, batch: Batch, metadata: Option<Vec<u8>>);
}

/// Ledger kept entirely in memory
pub struct MemoryLedger {
    chain_id: String,
    blocks: Arc<RwLock<Vec<Block>>>,
}

/// Cloneable read access to a `MemoryLedger`
#[derive(Clone)]
pub struct LedgerHandle {
    blocks: Arc<RwLock<Vec<Block>>>,
}

impl MemoryLedger {
    /// Creates an empty ledger for `chain_id`
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            blocks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns a read handle that stays valid after the ledger moves into a chain
    pub fn handle(&self) -> LedgerHandle {
        LedgerHandle {
            blocks: self.blocks.clone(),
        }
    }
}

impl Writer for MemoryLedger {
    fn append(&mut self, batch: Batch, metadata: Option<Vec<u8>>) {
        let mut blocks = self.blocks.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let block = Block {
            number: blocks.len() as u64,
            envelopes: batch,
            metadata,
            timestamp: chrono::Utc::now(),
        };
        info!(
            "Chain {} appended block #{} with {} envelopes",
            self.chain_id,
            block.number,
            block.envelopes.len()
        );
        blocks.push(block);
    }
}

impl LedgerHandle {
    /// Number of blocks appended so far
    pub fn height(&self) -> u64 {
        self.blocks.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len() as u64
    }

    /// Copy of the block at `number`, if it exists
    pub fn block(&self, number: u64) -> Option<Block> {
        let blocks = self.blocks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        usize::try_from(number).ok().and_then(|idx| blocks.get(idx).cloned())
    }

    /// Summaries of all blocks, oldest first
    pub fn summaries(&self) -> Vec<BlockSummary> {
        let blocks = self.blocks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        blocks.iter().map(BlockSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;

    #[test]
    fn test_blocks_numbered_from_zero() {
        let mut ledger = MemoryLedger::new("test");
        let handle = ledger.handle();

        ledger.append(vec![Envelope::new(b"a".to_vec())], None);
        ledger.append(vec![Envelope::new(b"b".to_vec()), Envelope::new(b"cd".to_vec())], None);

        assert_eq!(handle.height(), 2);
        assert_eq!(handle.block(0).unwrap().number, 0);

        let second = handle.block(1).unwrap();
        assert_eq!(second.number, 1);
        assert_eq!(second.envelopes.len(), 2);
        assert!(handle.block(2).is_none());
    }

    #[test]
    fn test_metadata_passed_through() {
        let mut ledger = MemoryLedger::new("test");
        let handle = ledger.handle();

        ledger.append(vec![Envelope::new(b"a".to_vec())], Some(vec![7, 7]));
        assert_eq!(handle.block(0).unwrap().metadata, Some(vec![7, 7]));
    }

    #[test]
    fn test_summaries() {
        let mut ledger = MemoryLedger::new("test");
        let handle = ledger.handle();
        ledger.append(vec![Envelope::new(b"abc".to_vec()), Envelope::new(b"de".to_vec())], None);

        let summaries = handle.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].envelope_count, 2);
        assert_eq!(summaries[0].payload_bytes, 5);
    }
}
