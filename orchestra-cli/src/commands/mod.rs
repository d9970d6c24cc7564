//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod import;
mod run;
mod upsert;
mod validate;

pub use run::RunArgs;
pub use upsert::UpsertArgs;

use clap::Subcommand;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::CommandError;
use orchestra_core::domain::pipeline::PipelineAlias;

/// Top-level CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a pipeline YAML file against the Orchestra schema
    Validate {
        /// Path to the pipeline YAML file
        file: PathBuf,
    },
    /// Import a pipeline stored in a git repository
    Import {
        /// Pipeline alias
        #[arg(short, long)]
        alias: PipelineAlias,

        /// Path to the pipeline YAML inside a git repository
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Start a pipeline run, optionally waiting for it to finish
    Run(RunArgs),
    /// Create an Orchestra-hosted pipeline from a local YAML file
    CreatePipeline(UpsertArgs),
    /// Update an Orchestra-hosted pipeline from a local YAML file
    UpdatePipeline(UpsertArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module. `shutdown` is
/// cancelled when the process receives an interrupt.
pub async fn handle_command(
    command: Commands,
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(), CommandError> {
    match command {
        Commands::Validate { file } => validate::handle_validate(config, &file).await,
        Commands::Import { alias, path } => import::handle_import(config, alias, &path).await,
        Commands::Run(args) => run::handle_run(config, args, shutdown).await,
        Commands::CreatePipeline(args) => {
            upsert::handle_upsert(config, upsert::UpsertAction::Create, args).await
        }
        Commands::UpdatePipeline(args) => {
            upsert::handle_upsert(config, upsert::UpsertAction::Update, args).await
        }
    }
}
