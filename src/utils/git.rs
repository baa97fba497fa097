//! Git as an external collaborator.
//!
//! Deployment only talks to git through the [`Vcs`] capability, so its
//! state machine runs against a fake in tests. [`GitCli`] is the real
//! implementation: every call is a `git` subprocess in the site root.
//!
//! Recognizing repository states and permission failures means matching
//! git's output text; those rules live in the pure functions
//! [`classify_status`] and [`is_permission_denied`].

pub mod ignore;

use super::exec::{capture, format_error, stderr_text, stdout_text};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Stderr phrase of `git status` outside a repository
const NOT_A_REPOSITORY: &str = "not a git repository";

/// Phrase pairs that all have to appear in stderr for a permission failure
const PERMISSION_DENIED: &[&[&str]] = &[
    &["remote: Permission to", "denied to"],
    &["fatal: unable to access", "The requested URL returned error: 403"],
    &["Permission denied (publickey)"],
];

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `git {args}`")]
    Spawn {
        args: String,
        #[source]
        source: io::Error,
    },

    #[error("permission denied by the remote repository\n{stderr}")]
    PermissionDenied { stderr: String },

    #[error("{0}")]
    Failed(String),
}

/// State of the working tree, as far as deployment cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    Clean,
    /// Uncommitted or untracked changes, with the porcelain listing
    Dirty(String),
    NotARepository,
    /// Anything git reported that none of the above explains
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    Local,
    /// Remote-tracking branches, as `<remote>/<branch>`
    Remote,
}

/// The version-control operations deployment depends on.
pub trait Vcs {
    fn status(&self) -> Result<RepoStatus, GitError>;

    fn branches(&self, scope: BranchScope) -> Result<Vec<String>, GitError>;

    fn remotes(&self) -> Result<Vec<String>, GitError>;

    /// Run a git command in `cwd` and return its trimmed stdout.
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn capture(&self, cwd: &Path, args: &[&str]) -> Result<std::process::Output, GitError> {
        capture(cwd, "git", args).map_err(|source| GitError::Spawn {
            args: args.join(" "),
            source,
        })
    }
}

impl Vcs for GitCli {
    fn status(&self) -> Result<RepoStatus, GitError> {
        let output = self.capture(&self.root, &["status", "--porcelain"])?;
        Ok(classify_status(
            output.status.success(),
            &stdout_text(&output),
            &stderr_text(&output),
        ))
    }

    fn branches(&self, scope: BranchScope) -> Result<Vec<String>, GitError> {
        let mut args = vec!["branch", "--format=%(refname:short)"];
        if scope == BranchScope::Remote {
            args.push("--remotes");
        }
        self.run(&self.root, &args).map(|out| parse_lines(&out))
    }

    fn remotes(&self) -> Result<Vec<String>, GitError> {
        self.run(&self.root, &["remote"]).map(|out| parse_lines(&out))
    }

    fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.capture(cwd, args)?;
        if output.status.success() {
            return Ok(stdout_text(&output));
        }

        let stderr = stderr_text(&output);
        if is_permission_denied(&stderr) {
            return Err(GitError::PermissionDenied { stderr });
        }
        Err(GitError::Failed(format_error(
            &format!("git {}", args.join(" ")),
            &output,
        )))
    }
}

/// Map the result of `git status --porcelain` to a [`RepoStatus`].
pub fn classify_status(success: bool, stdout: &str, stderr: &str) -> RepoStatus {
    match (success, stdout.trim()) {
        (true, "") => RepoStatus::Clean,
        (true, changes) => RepoStatus::Dirty(changes.to_owned()),
        (false, _) if stderr.contains(NOT_A_REPOSITORY) => RepoStatus::NotARepository,
        (false, _) => RepoStatus::Unrecognized(stderr.trim().to_owned()),
    }
}

pub fn is_permission_denied(stderr: &str) -> bool {
    PERMISSION_DENIED
        .iter()
        .any(|phrases| phrases.iter().all(|p| stderr.contains(p)))
}

/// Non-empty trimmed lines.
fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_clean() {
        assert_eq!(classify_status(true, "", ""), RepoStatus::Clean);
        assert_eq!(classify_status(true, "  \n", ""), RepoStatus::Clean);
    }

    #[test]
    fn test_classify_dirty() {
        let stdout = " M config.toml\n?? content/new.md";
        assert_eq!(
            classify_status(true, stdout, ""),
            RepoStatus::Dirty(stdout.into())
        );
    }

    #[test]
    fn test_classify_not_a_repository() {
        let stderr = "fatal: not a git repository (or any of the parent directories): .git";
        assert_eq!(
            classify_status(false, "", stderr),
            RepoStatus::NotARepository
        );
    }

    #[test]
    fn test_classify_unrecognized() {
        let stderr = "fatal: detected dubious ownership in repository";
        assert_eq!(
            classify_status(false, "", stderr),
            RepoStatus::Unrecognized(stderr.into())
        );
    }

    #[test]
    fn test_permission_denied_phrases() {
        assert!(is_permission_denied(
            "remote: Permission to user/blog.git denied to other.\nfatal: unable to access"
        ));
        assert!(is_permission_denied(
            "fatal: unable to access 'https://github.com/u/b.git/': The requested URL returned error: 403"
        ));
        assert!(is_permission_denied(
            "git@github.com: Permission denied (publickey).\nfatal: Could not read from remote repository."
        ));
    }

    #[test]
    fn test_other_failures_not_permission_denied() {
        assert!(!is_permission_denied(
            "fatal: unable to access 'https://x/': Could not resolve host: x"
        ));
        assert!(!is_permission_denied("remote: Permission to user/blog.git"));
        assert!(!is_permission_denied(""));
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            parse_lines("  origin\n\nupstream  \n"),
            ["origin", "upstream"]
        );
        assert!(parse_lines("").is_empty());
    }
}
