//! Reporter configuration.
//!
//! Every option can be given as a flag or through the environment
//! variable named next to it.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use a2s_engine::PollerConfig;
use a2s_query::{ClientConfig, DEFAULT_MAX_PACKET_SIZE};
use clap::{Parser, ValueEnum};

/// Smallest receive buffer that still fits one protocol-sized packet.
pub const MIN_PACKET_SIZE: usize = 1400;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Command-line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "a2s-reporter",
    version,
    about = "Polls a game server over A2S and serves its state as Prometheus metrics"
)]
pub struct Config {
    /// Port for the /metrics endpoint.
    #[arg(long, env = "REPORTER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Game server host name or IP.
    #[arg(long, env = "GAME_A2S_ADDRESS")]
    pub game_address: String,

    /// Game server query port.
    #[arg(long, env = "GAME_A2S_PORT")]
    pub game_port: u16,

    /// Milliseconds between probes.
    #[arg(long, env = "QUERY_INTERVAL", default_value_t = 10_000)]
    pub query_interval: u64,

    /// Milliseconds before a probe counts as failed.
    #[arg(long, env = "QUERY_TIMEOUT", default_value_t = 3_000)]
    pub query_timeout: u64,

    /// Receive buffer size. Some engines ignore the protocol's packet limit.
    #[arg(long, env = "QUERY_MAX_PACKET_SIZE", default_value_t = DEFAULT_MAX_PACKET_SIZE)]
    pub query_max_packet_size: usize,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.game_address.trim().is_empty(), "game address must not be empty");
        anyhow::ensure!(self.game_port != 0, "game port must not be 0");
        anyhow::ensure!(self.query_interval > 0, "query interval must be greater than 0 ms");
        anyhow::ensure!(self.query_timeout > 0, "query timeout must be greater than 0 ms");
        anyhow::ensure!(
            self.query_max_packet_size >= MIN_PACKET_SIZE,
            "query max packet size must be at least {MIN_PACKET_SIZE} bytes, got {}",
            self.query_max_packet_size
        );
        Ok(())
    }

    /// Poll interval and probe timeout.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.query_interval),
            timeout: Duration::from_millis(self.query_timeout),
        }
    }

    /// Target and receive settings for the A2S client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            address: self.game_address.clone(),
            port: self.game_port,
            max_packet_size: self.query_max_packet_size,
            timeout: Duration::from_millis(self.query_timeout),
        }
    }

    /// `0.0.0.0:<port>` for the metrics endpoint.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Config {
        let mut args = vec![
            "a2s-reporter",
            "--game-address",
            "10.0.0.5",
            "--game-port",
            "27015",
        ];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = parse(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.query_interval, 10_000);
        assert_eq!(config.query_timeout, 3_000);
        assert_eq!(config.query_max_packet_size, 14_000);
        assert_eq!(config.log_format, LogFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn target_is_required() {
        assert!(Config::try_parse_from(["a2s-reporter", "--game-port", "27015"]).is_err());
    }

    #[test]
    fn derived_configs() {
        let config = parse(&[
            "--query-interval",
            "500",
            "--query-timeout",
            "250",
            "--port",
            "9100",
        ]);

        let poller = config.poller_config();
        assert_eq!(poller.interval, Duration::from_millis(500));
        assert_eq!(poller.timeout, Duration::from_millis(250));

        let client = config.client_config();
        assert_eq!(client.address, "10.0.0.5");
        assert_eq!(client.port, 27015);
        assert_eq!(client.timeout, Duration::from_millis(250));

        assert_eq!(config.listen_addr(), "0.0.0.0:9100".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = parse(&["--query-interval", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = parse(&["--query-timeout", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn small_packet_size_is_rejected() {
        let config = parse(&["--query-max-packet-size", "512"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 1400"));
    }

    #[test]
    fn json_log_format() {
        let config = parse(&["--log-format", "json"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
