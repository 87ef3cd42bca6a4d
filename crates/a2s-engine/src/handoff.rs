//! Handoff channel between the poller and the reconciler.
//!
//! A bounded mpsc channel with a single slot: order is preserved, nothing
//! is dropped, and the poller waits on `emit` while the reconciler still
//! has an unconsumed outcome.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::outcome::ProbeOutcome;

/// Outcomes that may sit in the channel before the poller blocks.
pub const HANDOFF_CAPACITY: usize = 1;

/// The reconciler side is gone; the outcome is handed back.
#[derive(Debug, Error)]
#[error("outcome receiver has been dropped")]
pub struct HandoffClosed(pub ProbeOutcome);

/// Producer half, owned by the poller.
#[derive(Debug)]
pub struct OutcomeSender {
    tx: mpsc::Sender<ProbeOutcome>,
}

/// Consumer half, owned by the reconciler.
#[derive(Debug)]
pub struct OutcomeReceiver {
    rx: mpsc::Receiver<ProbeOutcome>,
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (OutcomeSender, OutcomeReceiver) {
    let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
    (OutcomeSender { tx }, OutcomeReceiver { rx })
}

impl OutcomeSender {
    /// Hand an outcome to the reconciler, waiting while the slot is full.
    pub async fn emit(&self, outcome: ProbeOutcome) -> Result<(), HandoffClosed> {
        self.tx
            .send(outcome)
            .await
            .map_err(|mpsc::error::SendError(outcome)| HandoffClosed(outcome))
    }
}

impl OutcomeReceiver {
    /// Next outcome in emit order; `None` once the sender is dropped and
    /// the channel is drained.
    pub async fn next(&mut self) -> Option<ProbeOutcome> {
        self.rx.recv().await
    }
}
