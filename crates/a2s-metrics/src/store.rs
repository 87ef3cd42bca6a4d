//! Metric store: the gauges published for one game server.
//!
//! Every gauge is an atomic; labeled gauges are `Family`s keyed by their
//! label set, so setting an existing key overwrites it and removing a key
//! retires the series. Writers and the exposition path share the store
//! through an `Arc` without further locking.
//!
//! Label values come straight from the game server. The encoder writes them
//! verbatim, so they are escaped when the label set is built; upserts and
//! removals go through the same constructors and therefore agree on keys.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::debug;

use crate::error::MetricsResult;

/// Prefix applied to every metric name.
pub const METRIC_PREFIX: &str = "a2s_server";

/// Labels for `a2s_server_player_count_with_server_name`.
///
/// Values are stored already escaped; build them with [`ServerLabels::new`].
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ServerLabels {
    pub server: String,
}

impl ServerLabels {
    /// Escape `server` into a label set.
    pub fn new(server: &str) -> Self {
        Self {
            server: escape_label_value(server),
        }
    }
}

/// Labels for `a2s_server_map_info`.
///
/// Values are stored already escaped; build them with [`MapLabels::new`].
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MapLabels {
    pub server_name: String,
    pub map: String,
}

impl MapLabels {
    /// Escape both values into a label set.
    pub fn new(server_name: &str, map: &str) -> Self {
        Self {
            server_name: escape_label_value(server_name),
            map: escape_label_value(map),
        }
    }
}

/// Escape a label value for the text exposition format: backslash, double
/// quote and line feed.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Point-in-time read of the unlabeled gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarValues {
    pub status: i64,
    pub player_count: i64,
    pub max_player_count: i64,
    pub bots: i64,
    pub password_set: i64,
    pub vac_enabled: i64,
}

/// Fixed boolean encoding: `true` → 1, `false` → 0.
pub fn bool_gauge(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

/// Registry plus handles to every gauge it exports.
#[derive(Debug)]
pub struct MetricStore {
    registry: Registry,
    status: Gauge,
    player_count: Gauge,
    max_player_count: Gauge,
    player_count_with_server_name: Family<ServerLabels, Gauge>,
    bots: Gauge,
    map_info: Family<MapLabels, Gauge>,
    password_set: Gauge,
    vac_enabled: Gauge,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricStore {
    /// Register all gauges. Scalars start at 0 and no labeled series exist.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix(METRIC_PREFIX);

        let status = Gauge::default();
        registry.register("status", "1 if server is up, 0 if not", status.clone());

        let player_count = Gauge::default();
        registry.register(
            "player_count",
            "Current number of players on the server",
            player_count.clone(),
        );

        let max_player_count = Gauge::default();
        registry.register(
            "max_player_count",
            "Maximum number of players allowed by the server",
            max_player_count.clone(),
        );

        let player_count_with_server_name = Family::<ServerLabels, Gauge>::default();
        registry.register(
            "player_count_with_server_name",
            "Player count keyed by server name",
            player_count_with_server_name.clone(),
        );

        let bots = Gauge::default();
        registry.register("bots", "Number of bots on the server", bots.clone());

        let map_info = Family::<MapLabels, Gauge>::default();
        registry.register(
            "map_info",
            "The current map on the server (labelled)",
            map_info.clone(),
        );

        let password_set = Gauge::default();
        registry.register(
            "password_set",
            "1 if password protected, 0 if public",
            password_set.clone(),
        );

        let vac_enabled = Gauge::default();
        registry.register("vac_enabled", "1 if VAC enabled, 0 if not", vac_enabled.clone());

        debug!(prefix = METRIC_PREFIX, "metric store registered");

        Self {
            registry,
            status,
            player_count,
            max_player_count,
            player_count_with_server_name,
            bots,
            map_info,
            password_set,
            vac_enabled,
        }
    }

    /// Set `a2s_server_status`: 1 up, 0 down.
    pub fn set_status(&self, up: bool) {
        self.status.set(bool_gauge(up));
    }

    /// Set `a2s_server_player_count`.
    pub fn set_player_count(&self, players: u32) {
        self.player_count.set(i64::from(players));
    }

    /// Set `a2s_server_max_player_count`.
    pub fn set_max_player_count(&self, max_players: u32) {
        self.max_player_count.set(i64::from(max_players));
    }

    /// Set `a2s_server_bots`.
    pub fn set_bots(&self, bots: u32) {
        self.bots.set(i64::from(bots));
    }

    /// Set `a2s_server_password_set`: 1 password protected, 0 public.
    pub fn set_password_set(&self, password_protected: bool) {
        self.password_set.set(bool_gauge(password_protected));
    }

    /// Set `a2s_server_vac_enabled`: 1 enabled, 0 not.
    pub fn set_vac_enabled(&self, vac: bool) {
        self.vac_enabled.set(bool_gauge(vac));
    }

    /// Upsert `player_count_with_server_name{server}`.
    pub fn set_server_players(&self, server: &str, players: u32) {
        self.player_count_with_server_name
            .get_or_create(&ServerLabels::new(server))
            .set(i64::from(players));
    }

    /// Retire `player_count_with_server_name{server}`. Returns whether it existed.
    pub fn remove_server_players(&self, server: &str) -> bool {
        self.player_count_with_server_name
            .remove(&ServerLabels::new(server))
    }

    /// Mark `(server_name, map)` as the current map.
    pub fn set_current_map(&self, server_name: &str, map: &str) {
        self.map_info
            .get_or_create(&MapLabels::new(server_name, map))
            .set(1);
    }

    /// Retire `map_info{server_name, map}`. Returns whether it existed.
    pub fn remove_map(&self, server_name: &str, map: &str) -> bool {
        self.map_info.remove(&MapLabels::new(server_name, map))
    }

    /// Read the unlabeled gauges.
    pub fn scalars(&self) -> ScalarValues {
        ScalarValues {
            status: self.status.get(),
            player_count: self.player_count.get(),
            max_player_count: self.max_player_count.get(),
            bots: self.bots.get(),
            password_set: self.password_set.get(),
            vac_enabled: self.vac_enabled.get(),
        }
    }

    /// Encode the registry in the text exposition format.
    pub fn render(&self) -> MetricsResult<String> {
        let mut out = String::new();
        prometheus_client::encoding::text::encode(&mut out, &self.registry)?;
        Ok(out)
    }
}
