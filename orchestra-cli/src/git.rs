//! Git introspection
//!
//! Read-only queries against the local repository: locating the repository
//! root, deriving the metadata sent on import and the warnings shown before
//! import or run. Every query shells out to `git` through a
//! [`CommandExecutor`] so tests can substitute scripted responses.

use orchestra_core::domain::pipeline::StorageProvider;
use orchestra_core::domain::repo::RepoMetadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Errors raised while inspecting the repository
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` could not be spawned at all
    #[error("git is unavailable: {0}")]
    Unavailable(String),

    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Could not detect repository URL or default branch from git")]
    MissingRemoteInfo,

    #[error("YAML file {} must be inside the git repository {}", .path.display(), .root.display())]
    OutsideRepository { path: PathBuf, root: PathBuf },
}

/// Captured result of one finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands on behalf of the introspector
pub trait CommandExecutor {
    /// Run `program` with `args` in `cwd` and wait for it to finish
    ///
    /// Returns `Err` only when the process could not be started.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput>;
}

/// Executes commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        // output() waits for the child, so no process outlives the call
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Read-only view of the git repository around a path
#[derive(Debug, Clone, Default)]
pub struct GitIntrospector<E = SystemExecutor> {
    executor: E,
}

impl GitIntrospector<SystemExecutor> {
    /// Introspector backed by the system `git` binary
    pub fn system() -> Self {
        Self::new(SystemExecutor)
    }
}

impl<E: CommandExecutor> GitIntrospector<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    #[cfg(test)]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn git(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput, GitError> {
        debug!(?args, cwd = %cwd.display(), "Running git");
        self.executor
            .run("git", args, cwd)
            .map_err(|e| GitError::Unavailable(e.to_string()))
    }

    /// Trimmed stdout of a successful query, `None` on any failure
    fn query(&self, args: &[&str], cwd: &Path) -> Option<String> {
        match self.git(args, cwd) {
            Ok(output) if output.success() => Some(output.stdout.trim().to_string()),
            Ok(output) => {
                debug!(?args, code = ?output.code, stderr = output.stderr.trim(), "git query failed");
                None
            }
            Err(e) => {
                debug!(?args, error = %e, "git query skipped");
                None
            }
        }
    }

    /// Locate the root of the repository containing `start_path`
    ///
    /// Git walks upward from `start_path` itself. A directory outside any
    /// repository yields [`GitError::NotARepository`].
    pub fn detect_repo_root(&self, start_path: &Path) -> Result<PathBuf, GitError> {
        if !start_path.is_dir() {
            return Err(GitError::NotARepository(start_path.to_path_buf()));
        }

        let output = self.git(&["rev-parse", "--show-toplevel"], start_path)?;
        let root = output.stdout.trim();

        if !output.success() || root.is_empty() {
            return Err(GitError::NotARepository(start_path.to_path_buf()));
        }

        Ok(PathBuf::from(root))
    }

    /// Human-readable warnings about the repository state
    ///
    /// Checks run in a fixed order: uncommitted changes, detached HEAD, no
    /// remote, then divergence from the upstream branch. A check whose git
    /// query fails is skipped.
    pub fn collect_warnings(&self, repo_root: &Path) -> Vec<String> {
        let mut warnings = Vec::new();

        if self
            .query(&["status", "--porcelain"], repo_root)
            .is_some_and(|out| !out.is_empty())
        {
            warnings.push("Uncommitted changes in working tree".to_string());
        }

        // exit code 1 means HEAD is not a symbolic ref
        if let Ok(output) = self.git(&["symbolic-ref", "-q", "HEAD"], repo_root) {
            if output.code == Some(1) {
                warnings.push("Detached HEAD: not on a branch".to_string());
            }
        }

        if self
            .query(&["remote"], repo_root)
            .is_some_and(|out| out.is_empty())
        {
            warnings.push("No git remote configured".to_string());
        }

        let has_upstream = self
            .query(
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
                repo_root,
            )
            .is_some_and(|upstream| !upstream.is_empty());

        if has_upstream {
            let local = self.query(&["rev-parse", "HEAD"], repo_root);
            let remote = self.query(&["rev-parse", "@{u}"], repo_root);
            if let (Some(local), Some(remote)) = (local, remote) {
                if local != remote {
                    warnings.push("Local branch SHA does not match remote branch SHA".to_string());
                }
            }

            if self
                .query(&["status", "-sb"], repo_root)
                .is_some_and(|out| tracking_behind(&out))
            {
                warnings.push(
                    "Local branch is behind its upstream: not on latest HEAD of the branch"
                        .to_string(),
                );
            }
        }

        warnings
    }

    /// Derive the metadata sent when importing a pipeline
    ///
    /// The `origin` remote and its default branch are required; branch, commit
    /// and dirty state are best-effort.
    pub fn repo_metadata(&self, repo_root: &Path) -> Result<RepoMetadata, GitError> {
        let remote = self.git(&["remote", "get-url", "origin"], repo_root)?;
        let remote_url = Some(remote.stdout.trim().to_string())
            .filter(|url| remote.success() && !url.is_empty());

        let repository = remote_url.as_deref().and_then(repository_slug);
        let default_branch = self.default_branch(repo_root);

        let (Some(repository), Some(default_branch)) = (repository, default_branch) else {
            return Err(GitError::MissingRemoteInfo);
        };

        let branch = self
            .query(&["rev-parse", "--abbrev-ref", "HEAD"], repo_root)
            .filter(|branch| !branch.is_empty() && branch != "HEAD");
        let commit = self
            .query(&["rev-parse", "HEAD"], repo_root)
            .filter(|sha| !sha.is_empty());
        let dirty = self
            .query(&["status", "--porcelain"], repo_root)
            .is_some_and(|out| !out.is_empty());

        Ok(RepoMetadata {
            root: repo_root.to_path_buf(),
            branch,
            commit,
            dirty,
            storage_provider: StorageProvider::from_remote_url(remote_url.as_deref()),
            remote_url,
            repository,
            default_branch,
        })
    }

    /// Default branch of `origin`
    fn default_branch(&self, repo_root: &Path) -> Option<String> {
        // refs/remotes/origin/main -> main
        if let Some(head) = self.query(&["symbolic-ref", "refs/remotes/origin/HEAD"], repo_root) {
            if let Some(branch) = head.rsplit('/').next().filter(|b| !b.is_empty()) {
                return Some(branch.to_string());
            }
        }

        let shown = self.query(&["remote", "show", "origin"], repo_root)?;
        shown
            .lines()
            .find_map(|line| line.trim().strip_prefix("HEAD branch:"))
            .map(str::trim)
            .filter(|branch| !branch.is_empty() && *branch != "(unknown)")
            .map(str::to_string)
    }
}

/// Whether the `status -sb` header reports the branch behind its upstream
///
/// Only the tracking bracket of the `## ` line counts, e.g.
/// `## main...origin/main [ahead 1, behind 2]`. Ref names cannot contain `[`.
fn tracking_behind(status: &str) -> bool {
    let Some(header) = status.lines().find_map(|line| line.strip_prefix("## ")) else {
        return false;
    };

    header
        .trim_end()
        .strip_suffix(']')
        .and_then(|rest| rest.rsplit_once('['))
        .is_some_and(|(_, tracking)| {
            tracking
                .split(',')
                .any(|part| part.trim().starts_with("behind "))
        })
}

/// Extract an `owner/repo` slug from a git remote URL
///
/// Handles `https://`, `ssh://`, scp-style `git@host:owner/repo.git` and
/// Azure DevOps `_git` URLs. Returns `None` when no path remains.
pub fn repository_slug(remote_url: &str) -> Option<String> {
    let mut url = remote_url.trim();

    if let Some((_, rest)) = url.split_once("://") {
        url = rest;
        if let (Some(at), Some(slash)) = (url.find('@'), url.find('/')) {
            if at < slash {
                url = &url[at + 1..];
            }
        }
    }

    // git@host:owner/repo.git -> git@host/owner/repo.git
    let normalized = match url.split_once(':') {
        Some((host, path)) if !host.contains('/') => format!("{}/{}", host, path),
        _ => url.to_string(),
    };

    let path = normalized
        .split_once('/')
        .map(|(_, path)| path)
        .unwrap_or(&normalized);

    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && !matches!(*segment, "_git" | "scm" | "v3"))
        .collect();

    let repo = segments.pop()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }

    match segments.last() {
        Some(owner) => Some(format!("{}/{}", owner, repo)),
        None => Some(repo.to_string()),
    }
}

/// Path of `file` relative to `repo_root`, with `/` separators
pub fn relative_yaml_path(repo_root: &Path, file: &Path) -> Result<String, GitError> {
    let root = repo_root
        .canonicalize()
        .unwrap_or_else(|_| repo_root.to_path_buf());
    let file_abs = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());

    let relative = file_abs
        .strip_prefix(&root)
        .map_err(|_| GitError::OutsideRepository {
            path: file.to_path_buf(),
            root: repo_root.to_path_buf(),
        })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        return Err(GitError::OutsideRepository {
            path: file.to_path_buf(),
            root: repo_root.to_path_buf(),
        });
    }

    Ok(parts.join("/"))
}
