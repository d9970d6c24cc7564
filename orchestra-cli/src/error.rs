//! Command error taxonomy
//!
//! Every failure a command can report. `main` renders these and exits with
//! status 1 regardless of the kind.

use orchestra_client::ClientError;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::domain::validation::ValidationResult;
use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad file, path or YAML
    #[error("{0}")]
    Input(String),

    /// Unusable flags or environment values
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Missing or rejected API key
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Unknown alias or run
    #[error("Not found: {0}")]
    NotFound(String),

    /// Alias already registered
    #[error("Already exists: {0}")]
    Conflict(String),

    /// The schema rejected the document
    #[error("Validation failed")]
    ValidationFailure(ValidationResult),

    /// Network failure, 5xx or unreadable response
    #[error("Request failed: {0}")]
    Transient(String),

    /// Any other error response
    #[error("Request rejected with status {status}: {message}")]
    Api { status: u16, message: String },

    /// A success response without the expected content
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("git is unavailable: {0}")]
    GitUnavailable(String),

    #[error("Not a git repository (could not detect repository root): {}", .0.display())]
    NotARepository(PathBuf),

    /// Repository exists but lacks what import needs
    #[error("{0}")]
    Repository(String),

    /// The run reached a terminal status other than success
    #[error("Run {handle} finished with status {status}")]
    RunFailed { handle: RunHandle, status: RunStatus },

    /// Interrupted while waiting on a run
    #[error("{}", cancelled_message(.handle))]
    CancelledLocally { handle: Option<RunHandle> },

    /// The user declined the confirmation prompt
    #[error("Aborted")]
    Aborted,
}

fn cancelled_message(handle: &Option<RunHandle>) -> String {
    match handle {
        Some(handle) => format!(
            "Cancelled locally while waiting on run {}; the remote run was not stopped",
            handle
        ),
        None => "Cancelled locally before the run was started".to_string(),
    }
}

impl From<ClientError> for CommandError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingToken => {
                CommandError::Auth("ORCHESTRA_API_KEY is not set".to_string())
            }
            ClientError::Unauthorized { message, .. } => CommandError::Auth(message),
            ClientError::NotFound(message) => CommandError::NotFound(message),
            ClientError::Conflict(message) => CommandError::Conflict(message),
            ClientError::InvalidUrl(message) => CommandError::Config(message),
            err if err.is_transient() => CommandError::Transient(err.to_string()),
            ClientError::ApiError { status, message } => CommandError::Api { status, message },
            other => CommandError::Transient(other.to_string()),
        }
    }
}

impl From<GitError> for CommandError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::Unavailable(message) => CommandError::GitUnavailable(message),
            GitError::NotARepository(path) => CommandError::NotARepository(path),
            other => CommandError::Repository(other.to_string()),
        }
    }
}
