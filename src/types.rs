use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-submitted transaction message
///
/// Opaque to the orderer: the scheduling loop never looks inside the payload,
/// it only moves envelopes between the cutter and the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Ordered group of envelopes destined for one block
pub type Batch = Vec<Envelope>;

/// Block appended to the ledger
///
/// Built by the writer from a cut batch. `number` starts at 0 and increases
/// by one for every appended batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub envelopes: Batch,
    pub metadata: Option<Vec<u8>>,
    pub timestamp: DateTime<Utc>,
}

/// Lightweight view of a block for logging and export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: u64,
    pub envelope_count: usize,
    pub payload_bytes: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        Self {
            number: block.number,
            envelope_count: block.envelopes.len(),
            payload_bytes: block.envelopes.iter().map(|env| env.payload.len()).sum(),
            timestamp: block.timestamp,
        }
    }
}
