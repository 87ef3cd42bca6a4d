//! Probe outcomes: what one poll cycle produced.

use a2s_query::{QueryError, QueryResult, ServerInfo};

/// Failure reason recorded when a probe exceeds its timeout.
pub const TIMEOUT_REASON: &str = "timeout";

/// The fields of a successful probe the reporter publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSnapshot {
    /// Server name as reported by the server; used as the label key.
    pub identity: String,
    /// Current map; may be empty.
    pub map: String,
    pub players: u32,
    pub max_players: u32,
    pub bots: u32,
    pub password_protected: bool,
    /// VAC enabled.
    pub anticheat_enabled: bool,
}

impl From<ServerInfo> for ServerSnapshot {
    fn from(info: ServerInfo) -> Self {
        Self {
            identity: info.name,
            map: info.map,
            players: u32::from(info.players),
            max_players: u32::from(info.max_players),
            bots: u32::from(info.bots),
            password_protected: info.visibility,
            anticheat_enabled: info.vac,
        }
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered and its info decoded.
    Snapshot(ServerSnapshot),
    /// No usable answer. `reason` is for logs only and never published.
    Failure { reason: String },
}

impl ProbeOutcome {
    /// Build a `Failure` with the given reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Convert a query result. A receive timeout becomes
    /// `Failure{"timeout"}`, the same as an expired probe; any other error
    /// becomes a `Failure` carrying its message.
    pub fn from_query(result: QueryResult<ServerInfo>) -> Self {
        match result {
            Ok(info) => Self::Snapshot(info.into()),
            Err(QueryError::Timeout(_)) => Self::failure(TIMEOUT_REASON),
            Err(e) => Self::failure(e.to_string()),
        }
    }

    /// `true` for a `Snapshot`.
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}
