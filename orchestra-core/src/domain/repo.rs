//! Repository metadata derived from local git state

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::pipeline::StorageProvider;

/// Snapshot of the git repository a pipeline is imported from
///
/// Built for a single `import` invocation and never persisted. `branch`,
/// `commit` and `dirty` are informational and are not sent on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Absolute repository root
    pub root: PathBuf,
    /// Current branch, `None` on a detached HEAD
    pub branch: Option<String>,
    /// Commit SHA of HEAD
    pub commit: Option<String>,
    /// Working tree has uncommitted changes
    pub dirty: bool,
    /// Raw URL of the `origin` remote
    pub remote_url: Option<String>,
    /// `owner/repo` slug extracted from the remote URL
    pub repository: String,
    /// Default branch of the remote
    pub default_branch: String,
    pub storage_provider: StorageProvider,
}
