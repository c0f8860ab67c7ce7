//! Ledger Module
//!
//! This module defines the writer contract the scheduling loop hands completed
//! batches to, plus an in-memory ledger used by the binary and tests.

mod memory;

pub use memory::{LedgerHandle, MemoryLedger, Writer};
