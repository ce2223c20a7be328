//! Version-control collaborator interface and its git CLI implementation

use crate::error::{DiffError, ErrorKind};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepo,
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GitError> for DiffError {
    fn from(err: GitError) -> Self {
        let message = err.to_string();
        match &err {
            GitError::NotARepo => DiffError::git(message)
                .with_help("Run diffnav inside a git repository or pass --repo."),
            GitError::CommandFailed { stderr, .. } => match classify_stderr(stderr) {
                ErrorKind::Permission => DiffError::permission(message),
                ErrorKind::Conflict => DiffError::conflict(message),
                _ => DiffError::git(message),
            },
            GitError::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                DiffError::permission(message)
            }
            GitError::Io(_) => DiffError::git(message),
        }
    }
}

/// Map git's stderr text to an error category
pub fn classify_stderr(stderr: &str) -> ErrorKind {
    if stderr.contains("Permission denied") {
        ErrorKind::Permission
    } else if stderr.contains("unmerged")
        || stderr.contains("conflict")
        || stderr.contains("You are in the middle")
    {
        ErrorKind::Conflict
    } else {
        ErrorKind::GitOp
    }
}

/// Commit metadata for log views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub subject: String,
    /// Author time as unix seconds
    pub date: i64,
    /// Reachable from a remote-tracking ref
    pub pushed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: String,
    /// Short branch name, or empty when detached
    pub branch: String,
    pub head: String,
}

/// Everything the viewer needs from version control.
///
/// Methods block; callers run them off the update loop.
pub trait Collaborator: Send + Sync + 'static {
    /// Unified diff of the working tree (staged and unstaged) against HEAD
    fn working_diff(&self) -> Result<String, DiffError>;
    fn commit_diff(&self, hash: &str) -> Result<String, DiffError>;
    fn commit_log(&self, limit: usize) -> Result<Vec<CommitEntry>, DiffError>;
    fn commit_log_for_ref(&self, reference: &str, limit: usize)
        -> Result<Vec<CommitEntry>, DiffError>;
    /// `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>, DiffError>;
    fn branches(&self) -> Result<Vec<BranchEntry>, DiffError>;
    fn worktrees(&self) -> Result<Vec<WorktreeEntry>, DiffError>;
    /// Paths relative to the repository root
    fn untracked_files(&self) -> Result<Vec<String>, DiffError>;
    fn file_content(&self, path: &str) -> Result<String, DiffError>;
}

/// Check if a directory is a git repository
pub fn is_git_repo(path: &Path) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(path)
        .arg("rev-parse")
        .arg("--git-dir")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get the root of the git repository
pub fn get_repo_root(path: &Path) -> Result<PathBuf, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .arg("rev-parse")
        .arg("--show-toplevel")
        .output()?;

    if !output.status.success() {
        return Err(GitError::NotARepo);
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

/// Collaborator backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Locate the repository containing `path`
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        Ok(Self::new(get_repo_root(path)?))
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .arg("-c")
            .arg("core.quotepath=false")
            .args(args)
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn log(&self, reference: &str, limit: usize) -> Result<Vec<CommitEntry>, DiffError> {
        let limit = limit.to_string();
        let output = self.run(&[
            "log",
            "-n",
            &limit,
            "--pretty=format:%H%x1f%h%x1f%an%x1f%at%x1f%s",
            reference,
            "--",
        ])?;
        let mut commits = parse_log(&output);

        // Unpushed commits are those not reachable from any remote ref
        match self.run(&["rev-list", "-n", &limit, reference, "--not", "--remotes"]) {
            Ok(unpushed) => {
                let unpushed: FxHashSet<&str> = unpushed.lines().map(str::trim).collect();
                for commit in &mut commits {
                    commit.pushed = !unpushed.contains(commit.hash.as_str());
                }
            }
            Err(err) => tracing::warn!(%err, "could not determine pushed commits"),
        }
        Ok(commits)
    }
}

impl Collaborator for GitCli {
    fn working_diff(&self) -> Result<String, DiffError> {
        Ok(self.run(&["diff", "HEAD", "--no-color", "--no-ext-diff", "-M"])?)
    }

    fn commit_diff(&self, hash: &str) -> Result<String, DiffError> {
        Ok(self.run(&[
            "show",
            "--format=",
            "--no-color",
            "--no-ext-diff",
            "-M",
            hash,
            "--",
        ])?)
    }

    fn commit_log(&self, limit: usize) -> Result<Vec<CommitEntry>, DiffError> {
        self.log("HEAD", limit)
    }

    fn commit_log_for_ref(
        &self,
        reference: &str,
        limit: usize,
    ) -> Result<Vec<CommitEntry>, DiffError> {
        self.log(reference, limit)
    }

    fn current_branch(&self) -> Result<Option<String>, DiffError> {
        let output = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = output.trim();
        if name.is_empty() || name == "HEAD" {
            Ok(None)
        } else {
            Ok(Some(name.to_string()))
        }
    }

    fn branches(&self) -> Result<Vec<BranchEntry>, DiffError> {
        let output = self.run(&["branch", "--format=%(HEAD)%1f%(refname:short)"])?;
        Ok(parse_branches(&output))
    }

    fn worktrees(&self) -> Result<Vec<WorktreeEntry>, DiffError> {
        let output = self.run(&["worktree", "list", "--porcelain"])?;
        Ok(parse_worktrees(&output))
    }

    fn untracked_files(&self) -> Result<Vec<String>, DiffError> {
        let output = self.run(&["ls-files", "--others", "--exclude-standard"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn file_content(&self, path: &str) -> Result<String, DiffError> {
        let bytes = std::fs::read(self.repo.join(path)).map_err(GitError::from)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn parse_log(output: &str) -> Vec<CommitEntry> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.trim_end().splitn(5, '\u{1f}').collect();
            if parts.len() < 5 {
                return None;
            }
            Some(CommitEntry {
                hash: parts[0].to_string(),
                short_hash: parts[1].to_string(),
                author: parts[2].to_string(),
                date: parts[3].trim().parse::<i64>().unwrap_or(0),
                subject: parts[4].to_string(),
                pushed: false,
            })
        })
        .collect()
}

fn parse_branches(output: &str) -> Vec<BranchEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (head, name) = line.split_once('\u{1f}')?;
            let name = name.trim();
            if name.is_empty() || name.starts_with('(') {
                return None;
            }
            Some(BranchEntry {
                name: name.to_string(),
                is_current: head.trim() == "*",
            })
        })
        .collect()
}

fn parse_worktrees(output: &str) -> Vec<WorktreeEntry> {
    let mut worktrees = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(entry) = current.take() {
                worktrees.push(entry);
            }
            current = Some(WorktreeEntry {
                path: path.to_string(),
                branch: String::new(),
                head: String::new(),
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(head) = line.strip_prefix("HEAD ") {
                entry.head = head.to_string();
            } else if let Some(branch) = line.strip_prefix("branch ") {
                entry.branch = branch
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch)
                    .to_string();
            }
        }
    }

    if let Some(entry) = current {
        worktrees.push(entry);
    }
    worktrees
}
