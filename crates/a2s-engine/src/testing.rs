//! Scripted probe sources and store readers shared by the engine's unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use a2s_metrics::MetricStore;
use a2s_query::{
    Environment, ExtraData, ProbeSource, QueryError, QueryResult, ServerInfo, ServerType,
};
use tokio::time::Instant;

pub(crate) fn server_info(name: &str, map: &str, players: u8) -> ServerInfo {
    ServerInfo {
        protocol: 17,
        name: name.to_string(),
        map: map.to_string(),
        folder: "csgo".to_string(),
        game: "Counter-Strike: Global Offensive".to_string(),
        app_id: 730,
        players,
        max_players: 10,
        bots: 1,
        server_type: ServerType::Dedicated,
        environment: Environment::Linux,
        visibility: false,
        vac: true,
        version: "1.38.7.9".to_string(),
        extra: ExtraData::default(),
    }
}

/// One scripted reply: wait `delay`, then return `result`.
pub(crate) struct Step {
    pub delay: Duration,
    pub result: QueryResult<ServerInfo>,
}

impl Step {
    pub(crate) fn ok(info: ServerInfo) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(info),
        }
    }

    pub(crate) fn err(error: QueryError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replays steps in order and records when each probe started.
/// Once the script runs out every probe fails with `EmptyResponse`.
pub(crate) struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Instant>>,
    repeat_delay: Option<Duration>,
}

impl ScriptedSource {
    pub(crate) fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            repeat_delay: None,
        }
    }

    /// A source whose every probe takes `delay` and then succeeds.
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            repeat_delay: Some(delay),
            ..Self::new(Vec::<Step>::new())
        }
    }

    pub(crate) fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProbeSource for ScriptedSource {
    async fn query_info(&self) -> QueryResult<ServerInfo> {
        self.calls.lock().unwrap().push(Instant::now());

        if let Some(delay) = self.repeat_delay {
            tokio::time::sleep(delay).await;
            return Ok(server_info("Slow Server", "de_nuke", 1));
        }

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                step.result
            }
            None => Err(QueryError::EmptyResponse),
        }
    }
}

/// Labeled samples currently exposed by `store`, in exposition order.
pub(crate) fn labeled_samples(store: &MetricStore) -> Vec<String> {
    let out = store.render().unwrap();
    out.lines()
        .filter(|line| !line.starts_with('#') && line.contains('{'))
        .map(str::to_string)
        .collect()
}
