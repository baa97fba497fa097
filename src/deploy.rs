//! Site deployment module.
//!
//! Publishes the generated site to a dedicated branch of the repository
//! that holds the site sources.
//!
//! ```text
//! status ──► NotARepository / Unrecognized ──► error
//!   │
//!   ├── Dirty ──► --autocommit? add, commit, push : error
//!   ▼
//! remotes? ──► publish branch exists? (else orphan + push)
//!   ▼
//! public/ ignored? (else append + commit)
//!   ▼
//! worktree add ../<site>-<branch> ──► clear ──► build ──► commit ──► push
//!   ▼
//! remove worktree
//! ```
//!
//! A failing step aborts everything after it; nothing is rolled back.

use crate::{
    config::defaults::PUBLISH_DIR,
    error::SiteError,
    log,
    logger::Logger,
    site::Site,
    utils::{
        fs::{clear_dir_except, remove_dir_if_exists},
        git::{BranchScope, GitCli, GitError, RepoStatus, Vcs, ignore::ensure_dir_ignored},
    },
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Marker telling GitHub Pages to skip Jekyll processing
const NOJEKYLL: &str = ".nojekyll";

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("`git` was not found in PATH")]
    GitNotInstalled,

    #[error("working directory is not a git repository")]
    NotARepository,

    #[error("git repository is in a state clog does not handle\n{0}")]
    UnrecognizedStatus(String),

    #[error(
        "working directory has changes that have not been committed \
         (use `--autocommit` to commit them)\n{0}"
    )]
    UncommittedChanges(String),

    #[error("git repository has no remotes")]
    NoRemotes,

    #[error("`{}` already exists; remove it before deploying", .0.display())]
    WorktreeExists(PathBuf),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("build failed")]
    Site(#[from] SiteError),

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),
}

trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T, DeployError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, DeployError> {
        self.map_err(|err| DeployError::Io(path.to_path_buf(), err))
    }
}

/// Build the site at `root` and publish it with the `git` executable.
pub fn deploy_site(root: &Path, autocommit: bool, logger: Logger) -> Result<(), DeployError> {
    which::which("git").map_err(|_| DeployError::GitNotInstalled)?;

    // git runs with the site root as cwd; every path handed to it is absolute
    let root = std::path::absolute(root).at(root)?;
    let mut site = Site::new(&root, logger);
    Deployer::new(&mut site, GitCli::new(&root), logger)
        .autocommit(autocommit)
        .deploy()
}

/// Deployment state machine over a [`Vcs`].
pub struct Deployer<'a, V> {
    site: &'a mut Site,
    vcs: V,
    logger: Logger,
    autocommit: bool,
}

impl<'a, V: Vcs> Deployer<'a, V> {
    pub fn new(site: &'a mut Site, vcs: V, logger: Logger) -> Self {
        Self {
            site,
            vcs,
            logger,
            autocommit: false,
        }
    }

    /// Commit and push pending changes instead of refusing to deploy.
    pub const fn autocommit(mut self, enabled: bool) -> Self {
        self.autocommit = enabled;
        self
    }

    pub fn deploy(&mut self) -> Result<(), DeployError> {
        self.site.validate()?;
        let deploy = self.site.load_config()?.deploy.clone();
        let (branch, remote) = (deploy.branch.as_str(), deploy.remote.as_str());

        self.check_status()?;
        self.ensure_remotes()?;
        self.ensure_publish_branch(branch, remote)?;
        self.ensure_ignored()?;

        let worktree = sibling_worktree(self.site.root(), branch).at(self.site.root())?;
        if worktree.exists() {
            return Err(DeployError::WorktreeExists(worktree));
        }
        self.publish(&worktree, branch, remote)?;

        log!(self.logger, "deploy"; "site deployed to {remote}/{branch}");
        Ok(())
    }

    fn root(&self) -> PathBuf {
        self.site.root().to_path_buf()
    }

    fn git(&self, cwd: &Path, args: &[&str]) -> Result<String, DeployError> {
        let output = self.vcs.run(cwd, args)?;
        self.logger.detail(&output);
        Ok(output)
    }

    fn check_status(&self) -> Result<(), DeployError> {
        match self.vcs.status()? {
            RepoStatus::Clean => Ok(()),
            RepoStatus::NotARepository => Err(DeployError::NotARepository),
            RepoStatus::Unrecognized(output) => Err(DeployError::UnrecognizedStatus(output)),
            RepoStatus::Dirty(changes) if !self.autocommit => {
                Err(DeployError::UncommittedChanges(changes))
            }
            RepoStatus::Dirty(changes) => {
                log!(self.logger, "deploy"; "auto-committing changes");
                self.logger.detail(&changes);
                self.commit_and_push_all()
            }
        }
    }

    fn commit_and_push_all(&self) -> Result<(), DeployError> {
        let root = self.root();
        let message = format!("Auto commit as {}", chrono::Local::now().format("%H:%M:%S"));
        self.git(&root, &["add", "--all"])?;
        self.git(&root, &["commit", "-m", &message])?;
        self.git(&root, &["push"])?;
        Ok(())
    }

    fn ensure_remotes(&self) -> Result<(), DeployError> {
        if self.vcs.remotes()?.is_empty() {
            return Err(DeployError::NoRemotes);
        }
        Ok(())
    }

    /// Create the publish branch as an orphan without leaving the current
    /// branch, then push it upstream.
    fn ensure_publish_branch(&self, branch: &str, remote: &str) -> Result<(), DeployError> {
        let tracking = format!("{remote}/{branch}");
        if self.vcs.branches(BranchScope::Remote)?.contains(&tracking) {
            return Ok(());
        }

        let root = self.root();
        if !self.vcs.branches(BranchScope::Local)?.iter().any(|b| b == branch) {
            log!(self.logger, "git"; "creating {branch} branch");
            let tree = self.git(&root, &["hash-object", "-w", "-t", "tree", "/dev/null"])?;
            let message = format!("Init {branch} branch");
            let commit = self.git(&root, &["commit-tree", &tree, "-m", &message])?;
            self.git(&root, &["branch", branch, &commit])?;
        }

        log!(self.logger, "git"; "pushing {branch} to {remote}");
        self.git(&root, &["push", "--set-upstream", remote, branch])?;
        Ok(())
    }

    fn ensure_ignored(&self) -> Result<(), DeployError> {
        let root = self.root();
        let gitignore = root.join(".gitignore");
        if ensure_dir_ignored(&gitignore, PUBLISH_DIR).at(&gitignore)? {
            log!(self.logger, "git"; "adding {PUBLISH_DIR}/ to .gitignore");
            self.git(&root, &["add", ".gitignore"])?;
            self.git(&root, &["commit", "-m", "Update .gitignore"])?;
        }
        Ok(())
    }

    fn publish(&mut self, worktree: &Path, branch: &str, remote: &str) -> Result<(), DeployError> {
        let root = self.root();
        let worktree_arg = worktree.to_string_lossy();

        log!(self.logger, "deploy"; "checking out {branch} in {}", worktree.display());
        self.git(&root, &["worktree", "add", &worktree_arg, branch])?;

        clear_dir_except(worktree, &[".git"]).at(worktree)?;
        self.site.build_into(worktree)?;
        let nojekyll = worktree.join(NOJEKYLL);
        fs::write(&nojekyll, "").at(&nojekyll)?;

        let source = self.git(&root, &["rev-parse", "HEAD"])?;
        self.git(worktree, &["add", "--all"])?;
        if self.git(worktree, &["status", "--porcelain"])?.is_empty() {
            log!(self.logger, "deploy"; "nothing changed since the last deploy");
        } else {
            let message = format!("Build output as of {source}");
            self.git(worktree, &["commit", "-m", &message])?;
            log!(self.logger, "git"; "pushing to {remote}/{branch}");
            self.git(worktree, &["push", remote, branch])?;
        }

        remove_dir_if_exists(worktree).at(worktree)?;
        self.git(&root, &["worktree", "prune"])?;
        Ok(())
    }
}

/// `<parent>/<site-dir>-<branch>`, next to the resolved site root.
fn sibling_worktree(root: &Path, branch: &str) -> io::Result<PathBuf> {
    let root = fs::canonicalize(root)?;
    let name = root
        .file_name()
        .map_or_else(|| "site".into(), |n| n.to_string_lossy());
    let parent = root.parent().unwrap_or(&root);
    Ok(parent.join(format!("{name}-{branch}")))
}
