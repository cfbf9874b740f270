//! arcade: runs a coordinator with the built-in games and relays JSON lines
//! from stdin to it

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use arcade_coordinator::{Coordinator, CoordinatorConfig};
use arcade_infra_common::logging::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
use arcade_session_core::LocalSessionRegistry;
use clap::Parser;
use tracing::info;

mod relay;

#[derive(Parser, Debug)]
#[command(name = "arcade", version, about = "Single-slot game session coordinator")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ARCADE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ARCADE_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new(parse_log_level(&cli.log_level)?, "arcade");
    if cli.json_logs {
        logging = logging.with_json();
    }
    setup_logging(logging)?;
    log_welcome("arcade", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => CoordinatorConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CoordinatorConfig::default(),
    };

    let games = config.game_factory();
    info!("Game kinds: {:?}", games.kinds());
    let registry = Arc::new(LocalSessionRegistry::new(config.registry_config(), Arc::new(games)));

    let (coordinator, task) = Coordinator::new(config, registry.clone()).spawn();
    relay::run(coordinator).await?;
    task.await.context("coordinator task failed")?;

    registry.shutdown();
    let stats = registry.stats();
    info!(
        "Sessions created: {}, stopped: {}, crashed: {}",
        stats.total_created, stats.total_stopped, stats.total_crashed
    );
    Ok(())
}
