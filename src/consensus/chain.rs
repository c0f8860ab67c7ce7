//! Chain Module
//!
//! The scheduling loop of a single ledger instance. One task per chain owns
//! the cutter, the writer and the batch timer, and handles one event at a time:
//!
//! 1. An envelope handed over by `enqueue` is offered to the cutter. Completed
//!    batches are written in order and the timer is disarmed; an accepted
//!    envelope that completes nothing arms the timer if it is not armed yet.
//! 2. When the timer expires the pending partial batch is cut and written.
//! 3. When the halt signal is raised the loop exits for good.
//!
//! Admission is a rendezvous: `enqueue` returns only once the loop has taken
//! the envelope (or the chain halted first), so a slow loop throttles its
//! submitters and at most one envelope waits to be processed.

use super::halt::{HaltSignal, wait_raised};
use super::{ConsenterSupport, ConsensusError};
use crate::{Batch, Envelope};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant, sleep_until};
use tracing::{Instrument, debug, info_span, trace, warn};

/// Envelope in transit from a submitter to the loop
///
/// The loop completes the handoff by firing `taken`; if the submitter has
/// already given up the envelope is discarded unprocessed.
struct Handoff {
    envelope: Envelope,
    taken: oneshot::Sender<()>,
}

/// Result of offering one envelope to the cutter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EnvelopeOutcome {
    /// The cutter rejected the envelope; nothing changed
    Rejected,
    /// Accepted without completing a batch
    Buffered { armed_timer: bool },
    /// Accepted and `batches` batches were written
    Written { batches: usize },
}

/// Result of a batch timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerOutcome {
    Written,
    EmptyCut,
}

/// Per-chain scheduling state, driven by the loop one event at a time
pub(super) struct ChainState {
    support: Box<dyn ConsenterSupport>,
    batch_timeout: Duration,
    timer: Option<Instant>,
}

impl ChainState {
    pub(super) fn new(support: Box<dyn ConsenterSupport>, batch_timeout: Duration) -> Self {
        Self {
            support,
            batch_timeout,
            timer: None,
        }
    }

    /// Deadline of the armed batch timer, if any
    pub(super) fn timer(&self) -> Option<Instant> {
        self.timer
    }

    pub(super) fn on_envelope(&mut self, envelope: Envelope, now: Instant) -> EnvelopeOutcome {
        let (batches, accepted) = self.support.block_cutter().ordered(envelope);
        if !accepted {
            debug!("Envelope rejected by block cutter");
            return EnvelopeOutcome::Rejected;
        }

        if batches.is_empty() {
            if self.timer.is_some() {
                return EnvelopeOutcome::Buffered { armed_timer: false };
            }
            self.timer = Some(now + self.batch_timeout);
            trace!("Batch timer armed for {:?}", self.batch_timeout);
            return EnvelopeOutcome::Buffered { armed_timer: true };
        }

        let count = batches.len();
        for batch in batches {
            self.write(batch);
        }
        // a cutter-returned batch resolves whatever was pending
        self.timer = None;
        EnvelopeOutcome::Written { batches: count }
    }

    pub(super) fn on_timer_expired(&mut self) -> TimerOutcome {
        self.timer = None;

        let batch = self.support.block_cutter().cut();
        if batch.is_empty() {
            warn!("Batch timer expired with no pending requests, this might indicate a bug");
            return TimerOutcome::EmptyCut;
        }

        debug!("Batch timer expired, creating block");
        self.write(batch);
        TimerOutcome::Written
    }

    fn write(&mut self, batch: Batch) {
        self.support.writer().append(batch, None);
    }
}

/// Everything the loop task owns
struct ChainLoop {
    state: ChainState,
    handoff_rx: mpsc::Receiver<Handoff>,
    halted: watch::Receiver<bool>,
    terminated: watch::Sender<bool>,
}

impl ChainLoop {
    async fn run(mut self) {
        debug!("Chain loop started");

        loop {
            let timer = self.state.timer();

            tokio::select! {
                biased;

                _ = wait_raised(&mut self.halted) => {
                    debug!("Exiting");
                    break;
                }
                _ = sleep_until(timer.unwrap_or_else(Instant::now)), if timer.is_some() => {
                    self.state.on_timer_expired();
                }
                handoff = self.handoff_rx.recv() => {
                    let Some(Handoff { envelope, taken }) = handoff else {
                        debug!("All submitters gone, exiting");
                        break;
                    };
                    if taken.send(()).is_err() {
                        trace!("Submitter withdrew before handoff completed");
                        continue;
                    }
                    match self.state.on_envelope(envelope, Instant::now()) {
                        EnvelopeOutcome::Written { batches } => trace!("Wrote {} batches", batches),
                        EnvelopeOutcome::Buffered { armed_timer } => {
                            trace!("Envelope buffered (timer armed: {})", armed_timer)
                        }
                        EnvelopeOutcome::Rejected => {}
                    }
                }
            }
        }

        let _ = self.terminated.send(true);
    }
}

/// Solo chain
///
/// Created by [`Consenter::handle_chain`](super::Consenter::handle_chain).
/// `enqueue` and `halt` may be called concurrently from any task; share the
/// chain behind an `Arc` to do so. Dropping the chain stops its loop.
pub struct Chain {
    chain_id: String,
    handoff_tx: mpsc::Sender<Handoff>,
    halt: HaltSignal,
    terminated: watch::Receiver<bool>,
    /// Loop state until `start` moves it into the loop task
    pending: Mutex<Option<ChainLoop>>,
}

impl Chain {
    pub(super) fn new(batch_timeout: Duration, support: Box<dyn ConsenterSupport>) -> Self {
        let chain_id = support.chain_id().to_string();
        // smallest bound tokio allows; submitters still wait for the loop's ack
        let (handoff_tx, handoff_rx) = mpsc::channel(1);
        let halt = HaltSignal::new();
        let (terminated_tx, terminated) = watch::channel(false);

        let chain_loop = ChainLoop {
            state: ChainState::new(support, batch_timeout),
            handoff_rx,
            halted: halt.subscribe(),
            terminated: terminated_tx,
        };

        Self {
            chain_id,
            handoff_tx,
            halt,
            terminated,
            pending: Mutex::new(Some(chain_loop)),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Spawn the scheduling loop on the current tokio runtime
    ///
    /// # Returns
    /// * `Ok(())` once the loop task is spawned
    /// * `Err(ConsensusError::AlreadyStarted)` if the loop was started before
    /// * `Err(ConsensusError::NoRuntime)` if called outside a tokio runtime
    pub fn start(&self) -> Result<(), ConsensusError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConsensusError::NoRuntime)?;

        let chain_loop = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(ConsensusError::AlreadyStarted)?;

        let span = info_span!("solo_chain", chain_id = %self.chain_id);
        runtime.spawn(chain_loop.run().instrument(span));
        Ok(())
    }

    /// Raise the halt signal
    ///
    /// Never blocks and may be called any number of times; only the first
    /// call has an effect.
    pub fn halt(&self) {
        if self.halt.raise() {
            debug!("Halt requested for chain {}", self.chain_id);
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_raised()
    }

    /// Hand an envelope to the scheduling loop
    ///
    /// Waits until the loop takes the envelope or the chain halts, whichever
    /// comes first.
    ///
    /// # Returns
    /// * `true` if the loop took the envelope for ordering
    /// * `false` if the chain is, or became, halted before the handoff completed
    pub async fn enqueue(&self, envelope: Envelope) -> bool {
        let (taken_tx, mut taken_rx) = oneshot::channel();
        let handoff = Handoff {
            envelope,
            taken: taken_tx,
        };

        tokio::select! {
            biased;

            _ = self.halt.raised() => return false,
            sent = self.handoff_tx.send(handoff) => {
                if sent.is_err() {
                    return false;
                }
            }
        }

        tokio::select! {
            biased;

            taken = &mut taken_rx => taken.is_ok(),
            _ = self.halt.raised() => {
                // closing first makes the loop's ack fail from here on, so the
                // answer below is final for both sides
                taken_rx.close();
                taken_rx.try_recv().is_ok()
            }
        }
    }

    /// Wait until the scheduling loop has exited
    ///
    /// Returns immediately if the loop was never started.
    pub async fn wait_terminated(&self) {
        let started = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none();
        if !started {
            return;
        }

        let mut terminated = self.terminated.clone();
        wait_raised(&mut terminated).await;
    }
}
