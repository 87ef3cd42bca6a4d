//! Reporter: the context object tying one probe source to one metric store.
//!
//! Built once at process start and passed to whoever needs to start or
//! read the engine; there is no global state.

use std::sync::Arc;
use std::time::Duration;

use a2s_metrics::MetricStore;
use a2s_query::ProbeSource;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::handoff;
use crate::poller::{Poller, PollerConfig};
use crate::reconciler::{Reconciler, TargetState};

/// Owns the probe source, the metric store and the poll timing.
pub struct Reporter<S> {
    source: Arc<S>,
    store: Arc<MetricStore>,
    config: PollerConfig,
}

impl<S: ProbeSource + 'static> Reporter<S> {
    /// Bind one probe source to one store. Nothing runs until [`spawn`].
    ///
    /// [`spawn`]: Reporter::spawn
    pub fn new(source: Arc<S>, store: Arc<MetricStore>, config: PollerConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Start the poller and reconciler tasks.
    ///
    /// Flipping `shutdown` to `true` stops the poller; the reconciler then
    /// drains the handoff channel and exits.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> ReporterHandle {
        let (tx, rx) = handoff::channel();

        let poller = Poller::new(self.source.clone(), self.config);
        let poller_task = tokio::spawn(async move {
            poller.run(tx, shutdown).await;
        });

        let reconciler = Reconciler::new(self.store.clone());
        let reconciler_task = tokio::spawn(reconciler.run(rx));

        info!("reporter tasks spawned");
        ReporterHandle {
            poller: poller_task,
            reconciler: reconciler_task,
        }
    }
}

/// Join handles for the running engine tasks.
pub struct ReporterHandle {
    poller: JoinHandle<()>,
    reconciler: JoinHandle<TargetState>,
}

impl ReporterHandle {
    /// Wait for both tasks to finish, at most `grace`. Tasks still running
    /// after that are aborted and `None` is returned.
    pub async fn join(self, grace: Duration) -> Option<TargetState> {
        let poller_abort = self.poller.abort_handle();
        let reconciler_abort = self.reconciler.abort_handle();

        let drained = tokio::time::timeout(grace, async move {
            if let Err(e) = self.poller.await {
                warn!(error = %e, "poller task failed");
            }
            match self.reconciler.await {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(error = %e, "reconciler task failed");
                    None
                }
            }
        })
        .await;

        match drained {
            Ok(state) => state,
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "engine drain timed out, aborting");
                poller_abort.abort();
                reconciler_abort.abort();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSource, Step, labeled_samples as labeled, server_info};
    use a2s_metrics::ScalarValues;
    use a2s_query::QueryError;

    /// Snapshot at t=0, failure at t=10s.
    #[tokio::test(start_paused = true)]
    async fn snapshot_then_failure_end_to_end() {
        let source = Arc::new(ScriptedSource::new([
            Step::ok(server_info("Server A", "de_dust2", 5)),
            Step::err(QueryError::Timeout(Duration::from_secs(3))),
        ]));
        let store = Arc::new(MetricStore::new());
        let reporter = Reporter::new(
            source,
            store.clone(),
            PollerConfig {
                interval: Duration::from_millis(10_000),
                timeout: Duration::from_millis(3_000),
            },
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = reporter.spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(
            store.scalars(),
            ScalarValues {
                status: 1,
                player_count: 5,
                max_player_count: 10,
                bots: 1,
                password_set: 0,
                vac_enabled: 1,
            }
        );
        assert_eq!(
            labeled(&store),
            vec![
                "a2s_server_player_count_with_server_name{server=\"Server A\"} 5".to_string(),
                "a2s_server_map_info{server_name=\"Server A\",map=\"de_dust2\"} 1".to_string(),
            ]
        );

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(store.scalars(), ScalarValues::default());
        assert!(labeled(&store).is_empty());

        shutdown_tx.send(true).unwrap();
        let state = handle.join(Duration::from_secs(5)).await;
        assert_eq!(state, Some(TargetState::Down));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_inflight_probe() {
        // The first probe would run for an hour; shutdown must not wait for it.
        let source = Arc::new(ScriptedSource::slow(Duration::from_secs(3600)));
        let store = Arc::new(MetricStore::new());
        let reporter = Reporter::new(
            source,
            store,
            PollerConfig {
                interval: Duration::from_secs(10),
                timeout: Duration::from_secs(7200),
            },
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = reporter.spawn(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown_tx.send(true).unwrap();
        assert_eq!(handle.join(Duration::from_secs(5)).await, Some(TargetState::Down));
    }
}
