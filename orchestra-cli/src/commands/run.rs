//! Run command handler

use clap::Args;
use colored::*;
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::dto::run::StartRun;
use std::io;
use std::path::Path;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::controller::{RunController, RunOutcome, RunRequest};
use crate::error::CommandError;
use crate::git::{CommandExecutor, GitIntrospector};

/// Arguments for `run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Pipeline alias
    #[arg(short, long)]
    pub alias: PipelineAlias,

    /// Wait for the run to finish, polling its status
    #[arg(long, overrides_with = "no_wait")]
    pub wait: bool,

    /// Return as soon as the run has started (default)
    #[arg(long, overrides_with = "wait")]
    pub no_wait: bool,

    /// Skip the confirmation prompt shown for git warnings
    #[arg(long)]
    pub force: bool,

    /// Git branch to run against
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Commit SHA to run against
    #[arg(short, long)]
    pub commit: Option<String>,
}

impl RunArgs {
    pub fn request(&self) -> RunRequest {
        RunRequest {
            alias: self.alias.clone(),
            wait: self.wait && !self.no_wait,
            overrides: StartRun {
                branch: self.branch.clone().filter(|b| !b.is_empty()),
                commit: self.commit.clone().filter(|c| !c.is_empty()),
            },
        }
    }
}

pub async fn handle_run(
    config: &Config,
    args: RunArgs,
    shutdown: CancellationToken,
) -> Result<(), CommandError> {
    config.require_api_key()?;

    if !args.force {
        let cwd = std::env::current_dir()
            .map_err(|e| CommandError::Input(format!("Cannot read working directory: {}", e)))?;
        let warnings = pipeline_warnings(&GitIntrospector::system(), &cwd);

        if !warnings.is_empty() {
            for warning in &warnings {
                eprintln!("{}", format!("⚠ {}", warning).yellow());
            }
            confirm(&shutdown).await?;
        }
    }

    let client = config.client()?;
    let controller = RunController::new(&client, config.poll_interval, shutdown);

    let outcome = controller
        .execute(&args.request(), |handle, status| print_status(handle, status))
        .await?;
    debug!(success = outcome.is_success(), "Run command finished");

    report_outcome(outcome)
}

/// Git warnings for the repository around `cwd`
///
/// Best-effort: outside a repository, or without git, there is nothing to
/// warn about.
pub fn pipeline_warnings<E: CommandExecutor>(git: &GitIntrospector<E>, cwd: &Path) -> Vec<String> {
    match git.detect_repo_root(cwd) {
        Ok(root) => git.collect_warnings(&root),
        Err(e) => {
            debug!(error = %e, "Skipping git warnings");
            Vec::new()
        }
    }
}

/// Wait for Enter on stdin, or abort on interrupt or end of input
async fn confirm(shutdown: &CancellationToken) -> Result<(), CommandError> {
    eprintln!(
        "{}",
        "Press Enter to continue or Ctrl+C to abort".yellow().bold()
    );

    // a detached thread, so a pending read never blocks runtime shutdown
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = tx.send(io::stdin().read_line(&mut line));
    });

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => Err(CommandError::Aborted),

        read = rx => match read {
            Ok(Ok(n)) if n > 0 => Ok(()),
            _ => {
                eprintln!("{}", "No input available; pass --force to skip this prompt".dimmed());
                Err(CommandError::Aborted)
            }
        },
    }
}

fn print_status(handle: &RunHandle, status: RunStatus) {
    let label = status.to_string();
    let label = match status {
        RunStatus::Succeeded => label.green(),
        RunStatus::Failed | RunStatus::Cancelled => label.red(),
        RunStatus::Pending | RunStatus::Running => label.cyan(),
    };
    eprintln!("{} {}", handle.to_string().dimmed(), label);
}

/// Print the run id and turn unsuccessful outcomes into errors
pub fn report_outcome(outcome: RunOutcome) -> Result<(), CommandError> {
    match outcome {
        RunOutcome::Started(handle) => {
            println!("{}", handle);
            Ok(())
        }
        RunOutcome::Finished { handle, status } if status.is_success() => {
            println!("{}", handle);
            Ok(())
        }
        RunOutcome::Finished { handle, status } => Err(CommandError::RunFailed { handle, status }),
        RunOutcome::CancelledLocally { handle } => Err(CommandError::CancelledLocally { handle }),
    }
}
