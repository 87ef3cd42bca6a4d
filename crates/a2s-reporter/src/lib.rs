//! a2s-reporter: the reporter daemon.
//!
//! Assembles the A2S client, the engine, and the `/metrics` endpoint into
//! one process.
//!
//! # Usage
//!
//! ```text
//! GAME_A2S_ADDRESS=10.0.0.5 GAME_A2S_PORT=27015 a2s-reporter
//! a2s-reporter --game-address 10.0.0.5 --game-port 27015 --port 3000
//! ```

pub mod config;
pub mod daemon;
pub mod exporter;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use exporter::build_router;
