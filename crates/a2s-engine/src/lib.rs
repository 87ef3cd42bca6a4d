//! a2s-engine: polling and metric reconciliation for the A2S reporter.
//!
//! # Architecture
//!
//! ```text
//! Poller ──emit──▶ handoff (capacity 1) ──next──▶ Reconciler ──▶ MetricStore
//!   │                                                             ▲
//!   └── ProbeSource::query_info() under a timeout                 │
//!                                                    /metrics reads┘
//! ```
//!
//! The poller probes once at start and then once per interval, never
//! overlapping probes. The reconciler is the store's only writer and keeps
//! at most one labeled series per labeled gauge. [`Reporter`] owns the
//! pieces and spawns both tasks.

pub mod handoff;
pub mod outcome;
pub mod poller;
pub mod reconciler;
pub mod reporter;

#[cfg(test)]
mod testing;

pub use handoff::{HANDOFF_CAPACITY, HandoffClosed, OutcomeReceiver, OutcomeSender};
pub use outcome::{ProbeOutcome, ServerSnapshot, TIMEOUT_REASON};
pub use poller::{Poller, PollerConfig};
pub use reconciler::{Reconciler, TargetState};
pub use reporter::{Reporter, ReporterHandle};
