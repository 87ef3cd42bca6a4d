//! a2s-metrics: the published state of one game server.
//!
//! Holds the gauge registry the reporter exports and encodes it in the
//! Prometheus text exposition format.
//!
//! # Metrics
//!
//! | Name | Labels | Meaning |
//! |---|---|---|
//! | `a2s_server_status` | | 1 up, 0 down |
//! | `a2s_server_player_count` | | players, 0 when down |
//! | `a2s_server_max_player_count` | | capacity, 0 when down |
//! | `a2s_server_player_count_with_server_name` | `server` | players; absent when down |
//! | `a2s_server_bots` | | bots, 0 when down |
//! | `a2s_server_map_info` | `server_name`, `map` | 1 for the current pair; absent when down |
//! | `a2s_server_password_set` | | 1 password protected |
//! | `a2s_server_vac_enabled` | | 1 VAC enabled |

pub mod error;
pub mod store;

pub use error::{MetricsError, MetricsResult};
pub use store::{MapLabels, MetricStore, ScalarValues, ServerLabels, bool_gauge, escape_label_value};
