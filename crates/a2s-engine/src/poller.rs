//! Poller: probes the target on a fixed interval.
//!
//! The first probe runs immediately; after that one probe per interval.
//! Probes never overlap: a cycle is probe + handoff, and the next tick is
//! only awaited once the previous outcome has been handed off. If a cycle
//! outlasts the interval the missed tick fires once, right away, and the
//! schedule restarts from that point (`MissedTickBehavior::Delay`), so at
//! most one tick is ever pending.

use std::sync::Arc;
use std::time::Duration;

use a2s_query::ProbeSource;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::handoff::OutcomeSender;
use crate::outcome::{ProbeOutcome, TIMEOUT_REASON};

/// Shortest interval the poller will run with.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timing for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between probe starts. Raised to [`MIN_INTERVAL`] if smaller.
    pub interval: Duration,
    /// Upper bound on one probe.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10_000),
            timeout: Duration::from_millis(3_000),
        }
    }
}

/// Drives a [`ProbeSource`] and forwards each outcome to the reconciler.
pub struct Poller<S> {
    source: Arc<S>,
    config: PollerConfig,
}

impl<S: ProbeSource> Poller<S> {
    /// Create a poller over `source`. A zero interval is raised to
    /// [`MIN_INTERVAL`].
    pub fn new(source: Arc<S>, mut config: PollerConfig) -> Self {
        if config.interval < MIN_INTERVAL {
            warn!(
                interval_ms = config.interval.as_millis() as u64,
                "poll interval below minimum, clamping"
            );
            config.interval = MIN_INTERVAL;
        }
        Self { source, config }
    }

    /// Run a single probe bounded by the configured timeout.
    pub async fn probe(&self) -> ProbeOutcome {
        match tokio::time::timeout(self.config.timeout, self.source.query_info()).await {
            Ok(result) => ProbeOutcome::from_query(result),
            Err(_) => ProbeOutcome::failure(TIMEOUT_REASON),
        }
    }

    /// Poll until shutdown is signalled or the reconciler goes away.
    ///
    /// Dropping `tx` on return closes the handoff channel, which lets the
    /// reconciler drain and stop.
    pub async fn run(&self, tx: OutcomeSender, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "poller started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            cycle += 1;
            let outcome = tokio::select! {
                outcome = self.probe() => outcome,
                _ = shutdown.changed() => break,
            };

            match &outcome {
                ProbeOutcome::Snapshot(snap) => {
                    debug!(
                        cycle,
                        server = %snap.identity,
                        players = snap.players,
                        "probe succeeded"
                    );
                }
                ProbeOutcome::Failure { reason } => {
                    warn!(cycle, %reason, "probe failed");
                }
            }

            tokio::select! {
                sent = tx.emit(outcome) => {
                    if sent.is_err() {
                        warn!(cycle, "reconciler stopped, poller exiting");
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!(cycles = cycle, "poller stopped");
    }
}
