//! Block Cutter Module
//!
//! This module defines the contract the scheduling loop uses to group envelopes
//! into batches, plus a count-based reference implementation:
//! - BlockCutter: decides per envelope whether a batch is ready, and flushes on demand
//! - CountCutter: cuts a batch every `max_message_count` envelopes

mod cutter;

pub use cutter::{BlockCutter, CountCutter};
