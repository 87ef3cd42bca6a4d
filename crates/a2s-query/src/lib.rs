//! a2s-query: the probe side of the A2S reporter.
//!
//! Speaks the Source engine A2S_INFO query over UDP, including the
//! challenge handshake and split-packet reassembly, and exposes the result
//! through the [`ProbeSource`] trait consumed by the engine.
//!
//! # Architecture
//!
//! ```text
//! A2sClient (ProbeSource)
//!   ├── packet : framing, request encoding, split reassembly
//!   └── info   : A2S_INFO body → ServerInfo
//! ```

pub mod client;
pub mod error;
pub mod info;
pub mod packet;

pub use client::{A2sClient, ClientConfig, DEFAULT_MAX_PACKET_SIZE, ProbeSource};
pub use error::{QueryError, QueryResult};
pub use info::{Environment, ExtraData, ServerInfo, ServerType};
