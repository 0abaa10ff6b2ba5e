//! bookmark-sorter binary
//!
//! Loads configuration, installs logging, and runs one CLI command against
//! the persistent bookmark store.

use anyhow::Context;
use bookmark_sorter::config::ConfigLoader;
use bookmark_sorter::logging::{init_logging, LogOverrides};
use bookmark_sorter::tooling::{Cli, CliContext};
use clap::Parser;
use std::process;

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config =
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let overrides = LogOverrides {
        level: cli.log_level.clone(),
        format: cli.log_format.clone(),
        output: cli.log_output.clone(),
        file: cli.log_file.clone(),
    };
    init_logging(Some(&config.logging), &overrides).context("Failed to initialize logging")?;

    let context = CliContext::from_config(config, cli.store.clone())
        .context("Failed to open bookmark store")?;
    let output = context.execute(&cli.command).await?;
    Ok(output)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
