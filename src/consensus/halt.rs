use std::sync::Arc;
use tokio::sync::watch;

/// One-way shutdown flag observed by the chain loop and every submitter
///
/// Raising is a compare-and-set on the watched value, so only the first call
/// notifies; later calls see it already set and do nothing.
#[derive(Debug, Clone)]
pub(super) struct HaltSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl HaltSignal {
    pub(super) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    pub(super) fn raise(&self) -> bool {
        self.tx.send_if_modified(|halted| {
            if *halted {
                false
            } else {
                *halted = true;
                true
            }
        })
    }

    pub(super) fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Resolves once the signal is raised
    pub(super) async fn raised(&self) {
        let mut rx = self.subscribe();
        wait_raised(&mut rx).await;
    }
}

/// Resolves once the watched flag is set, or its sender is gone
pub(super) async fn wait_raised(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|halted| *halted).await;
}
