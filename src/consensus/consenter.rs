//! Consenter Module
//!
//! Factory for solo chains. Solo ordering has no negotiation step, so handing
//! a chain to the consenter always succeeds.

use super::{Chain, ConsensusError};
use crate::blockcutter::BlockCutter;
use crate::config::SoloConfig;
use crate::ledger::Writer;
use std::time::Duration;

/// Collaborators a chain drives from its loop
///
/// Only the chain's loop task touches the support once the chain is started,
/// so implementations need no internal synchronization.
pub trait ConsenterSupport: Send + 'static {
    /// Identifier of the ledger instance, used to scope log output
    fn chain_id(&self) -> &str;

    fn block_cutter(&mut self) -> &mut dyn BlockCutter;

    fn writer(&mut self) -> &mut dyn Writer;
}

/// Plain bundle of a cutter and a writer for one chain
pub struct ChainSupport<C, W> {
    chain_id: String,
    cutter: C,
    writer: W,
}

impl<C, W> ChainSupport<C, W>
where
    C: BlockCutter + 'static,
    W: Writer + 'static,
{
    pub fn new(chain_id: impl Into<String>, cutter: C, writer: W) -> Self {
        Self {
            chain_id: chain_id.into(),
            cutter,
            writer,
        }
    }
}

impl<C, W> ConsenterSupport for ChainSupport<C, W>
where
    C: BlockCutter + 'static,
    W: Writer + 'static,
{
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn block_cutter(&mut self) -> &mut dyn BlockCutter {
        &mut self.cutter
    }

    fn writer(&mut self) -> &mut dyn Writer {
        &mut self.writer
    }
}

/// Solo consenter
///
/// Holds the batch timeout every chain it creates is bound to.
#[derive(Debug, Clone)]
pub struct Consenter {
    batch_timeout: Duration,
}

impl Consenter {
    /// Creates a new consenter
    ///
    /// # Arguments
    /// * `batch_timeout` - How long a partial batch may wait before it is cut
    pub fn new(batch_timeout: Duration) -> Self {
        Self { batch_timeout }
    }

    pub fn from_config(config: &SoloConfig) -> Self {
        Self::new(config.batch_timeout())
    }

    pub fn batch_timeout(&self) -> Duration {
        self.batch_timeout
    }

    /// Create the chain for a newly activated ledger instance
    ///
    /// The returned chain is not running yet; call [`Chain::start`].
    ///
    /// # Arguments
    /// * `support` - The cutter and writer the chain's loop will drive
    pub fn handle_chain<S: ConsenterSupport>(&self, support: S) -> Result<Chain, ConsensusError> {
        Ok(Chain::new(self.batch_timeout, Box::new(support)))
    }
}
