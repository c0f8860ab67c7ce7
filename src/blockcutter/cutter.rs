//! Batch Cutting Module
//!
//! The cutter owns the pending partial batch. The chain only asks it two
//! questions: "does this envelope complete anything?" and "flush whatever you
//! have".

use crate::{Batch, Envelope};
use tracing::debug;

/// Batch cutting contract consumed by the scheduling loop
///
/// Called only from the chain's loop task, one call at a time.
pub trait BlockCutter: Send {
    /// Offer an envelope to the cutter
    ///
    /// # Returns
    /// * `(batches, true)` if the envelope was accepted; `batches` holds zero or
    ///   more completed batches in the order they must be written
    /// * `(_, false)` if the envelope was rejected and counts toward no batch
    fn ordered(&mut self, envelope: Envelope) -> (Vec<Batch>, bool);

    /// Flush the pending partial batch
    ///
    /// Returns an empty batch if nothing was pending.
    fn cut(&mut self) -> Batch;
}

/// Count-based cutter
///
/// Buffers accepted envelopes and emits a batch once `max_message_count` are
/// pending. Envelopes with an empty payload are rejected.
pub struct CountCutter {
    max_message_count: usize,
    pending: Batch,
}

impl CountCutter {
    /// Creates a new cutter
    ///
    /// # Arguments
    /// * `max_message_count` - Envelopes per batch (values below 1 are treated as 1)
    pub fn new(max_message_count: usize) -> Self {
        let max_message_count = max_message_count.max(1);
        Self {
            max_message_count,
            pending: Vec::with_capacity(max_message_count),
        }
    }

    /// Number of envelopes waiting for the next batch
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl BlockCutter for CountCutter {
    fn ordered(&mut self, envelope: Envelope) -> (Vec<Batch>, bool) {
        if envelope.is_empty() {
            debug!("Rejecting envelope with empty payload");
            return (Vec::new(), false);
        }

        self.pending.push(envelope);
        if self.pending.len() < self.max_message_count {
            return (Vec::new(), true);
        }

        debug!("Batch size reached ({} envelopes), cutting", self.pending.len());
        (vec![self.cut()], true)
    }

    fn cut(&mut self) -> Batch {
        std::mem::replace(&mut self.pending, Vec::with_capacity(self.max_message_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(tag: &str) -> Envelope {
        Envelope::new(tag.as_bytes().to_vec())
    }

    #[test]
    fn test_buffers_until_full() {
        let mut cutter = CountCutter::new(3);

        assert_eq!(cutter.ordered(env("a")), (vec![], true));
        assert_eq!(cutter.ordered(env("b")), (vec![], true));
        assert_eq!(cutter.pending_len(), 2);

        let (batches, accepted) = cutter.ordered(env("c"));
        assert!(accepted);
        assert_eq!(batches, vec![vec![env("a"), env("b"), env("c")]]);
        assert_eq!(cutter.pending_len(), 0);
    }

    #[test]
    fn test_rejects_empty_payload() {
        let mut cutter = CountCutter::new(2);
        cutter.ordered(env("a"));

        let (batches, accepted) = cutter.ordered(Envelope::new(Vec::new()));
        assert!(!accepted);
        assert!(batches.is_empty());
        // rejected envelope must not count toward the batch
        assert_eq!(cutter.pending_len(), 1);
    }

    #[test]
    fn test_cut_drains_pending() {
        let mut cutter = CountCutter::new(10);
        cutter.ordered(env("a"));
        cutter.ordered(env("b"));

        assert_eq!(cutter.cut(), vec![env("a"), env("b")]);
        assert!(cutter.cut().is_empty());
    }

    #[test]
    fn test_single_message_batches() {
        let mut cutter = CountCutter::new(0);
        let (batches, accepted) = cutter.ordered(env("x"));
        assert!(accepted);
        assert_eq!(batches, vec![vec![env("x")]]);
    }
}
