use a2s_reporter::{Config, daemon, telemetry};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(config.log_format);

    info!(
        port = config.port,
        target = %format!("{}:{}", config.game_address, config.game_port),
        "starting A2S reporter"
    );

    daemon::run(config).await.inspect_err(|e| {
        error!(error = %format!("{e:#}"), "a2s reporter failed");
    })
}
