//! Reconciler: turns probe outcomes into metric state.
//!
//! The reconciler is the only writer of the [`MetricStore`]. It remembers
//! which `(server, map)` pair it last published so that, when the server
//! goes down, renames itself, or rotates maps, the old labeled series are
//! removed instead of lingering. At any time each labeled gauge holds at
//! most the one series matching [`TargetState::Up`].

use std::sync::Arc;

use a2s_metrics::MetricStore;
use tracing::{debug, info, warn};

use crate::handoff::OutcomeReceiver;
use crate::outcome::{ProbeOutcome, ServerSnapshot};

/// What the reconciler currently publishes for the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetState {
    /// No labeled series are published.
    #[default]
    Down,
    /// The labeled series for this identity and map are published.
    Up { identity: String, map: String },
}

/// Sole writer of the metric store; tracks what it last published.
pub struct Reconciler {
    store: Arc<MetricStore>,
    state: TargetState,
}

impl Reconciler {
    /// Start in `Down` with nothing published.
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self {
            store,
            state: TargetState::Down,
        }
    }

    /// The state after the last applied outcome.
    pub fn state(&self) -> &TargetState {
        &self.state
    }

    /// Apply one outcome to the store.
    pub fn apply(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Snapshot(snap) => self.apply_snapshot(snap),
            ProbeOutcome::Failure { reason } => self.apply_failure(reason),
        }
    }

    fn apply_failure(&mut self, reason: &str) {
        let store = &self.store;
        store.set_status(false);
        store.set_player_count(0);
        store.set_max_player_count(0);
        store.set_bots(0);
        store.set_password_set(false);
        store.set_vac_enabled(false);

        match std::mem::take(&mut self.state) {
            TargetState::Up { identity, map } => {
                store.remove_server_players(&identity);
                // The state records exactly the pair that was published, so
                // an empty map name is still a known series to retire.
                store.remove_map(&identity, &map);
                warn!(server = %identity, %map, %reason, "server marked down");
            }
            TargetState::Down => {
                debug!(%reason, "server still down");
            }
        }
    }

    fn apply_snapshot(&mut self, snap: &ServerSnapshot) {
        let store = &self.store;
        store.set_status(true);

        match &self.state {
            TargetState::Up { identity, map } => {
                if *identity != snap.identity {
                    store.remove_server_players(identity);
                    info!(from = %identity, to = %snap.identity, "server identity changed");
                }
                if *identity != snap.identity || *map != snap.map {
                    store.remove_map(identity, map);
                    if *map != snap.map {
                        info!(server = %snap.identity, from = %map, to = %snap.map, "map changed");
                    }
                }
            }
            TargetState::Down => {
                info!(server = %snap.identity, map = %snap.map, "server is up");
            }
        }

        store.set_player_count(snap.players);
        store.set_max_player_count(snap.max_players);
        store.set_bots(snap.bots);
        store.set_password_set(snap.password_protected);
        store.set_vac_enabled(snap.anticheat_enabled);
        store.set_server_players(&snap.identity, snap.players);
        store.set_current_map(&snap.identity, &snap.map);

        self.state = TargetState::Up {
            identity: snap.identity.clone(),
            map: snap.map.clone(),
        };
    }

    /// Consume outcomes until the poller closes the channel.
    ///
    /// Anything already in the channel when the poller stops is still
    /// applied. Returns the final state.
    pub async fn run(mut self, mut rx: OutcomeReceiver) -> TargetState {
        info!("reconciler started");
        let mut applied: u64 = 0;

        while let Some(outcome) = rx.next().await {
            self.apply(&outcome);
            applied += 1;
        }

        info!(applied, "reconciler stopped");
        self.state
    }
}
