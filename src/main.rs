use anyhow::Result;
use clap::Parser;

use solverbench::application::{Cli, CommandExecutor};
use solverbench::shared::config::{BenchConfig, ConfigLoader};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    // Load base configuration with priority: CLI args > Config file > Defaults
    let mut config = if let Some(config_path) = &cli.config {
        ConfigLoader::load_from(config_path)?
    } else if std::path::Path::new("Config.toml").exists() {
        ConfigLoader::load_config()?
    } else {
        BenchConfig::default()
    };

    // Override with CLI args if provided (CLI has higher priority)
    if let Some(endpoint) = cli.endpoint {
        config.optimizer.endpoint = endpoint;
    }

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
