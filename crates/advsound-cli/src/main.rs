//! # advsound
//!
//! Command-line player built on the advsound sound controller.

mod cli;
mod config;
mod play;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "advsound=info,advsound_engine=debug,advsound_backend=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    info!(
        "Starting advsound v{} (controller API {})",
        env!("CARGO_PKG_VERSION"),
        advsound_engine::API_VERSION
    );

    let config = AppConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Play(args) => play::run(args, &config),
        Command::Config => {
            if let Some(path) = AppConfig::default_path() {
                info!("Default config file: {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
