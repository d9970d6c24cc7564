//! Orchestra CLI
//!
//! Command-line interface for validating, importing and running pipelines
//! on Orchestra.

mod commands;
mod config;
mod controller;
mod document;
mod error;
mod git;
mod signal;
#[cfg(test)]
mod testing;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use error::CommandError;
use orchestra_client::DEFAULT_API_URL;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "orchestra")]
#[command(about = "Orchestra CLI: perform operations with Orchestra locally", long_about = None)]
struct Cli {
    /// Endpoint template for the pipelines API, with `{}` marking the path
    #[arg(long, global = true, env = "BASE_URL", default_value = DEFAULT_API_URL)]
    base_url: String,

    /// API key sent as a bearer token
    #[arg(long, global = true, env = "ORCHESTRA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchestra=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = Config::from_args(&cli.base_url, cli.api_key)?;
    debug!(base_url = config.api_url.template(), "Loaded configuration");

    let shutdown = CancellationToken::new();
    signal::cancel_on_signal(shutdown.clone());

    let result = handle_command(cli.command, &config, shutdown.clone()).await;
    // stops the signal listener
    shutdown.cancel();
    result
}

fn report_error(err: &CommandError) {
    eprintln!("{}", format!("✗ {}", err).red());

    if let CommandError::ValidationFailure(result) = err {
        for issue in &result.errors {
            eprintln!("{}", format!("  {}", issue).yellow());
        }
    }
}
