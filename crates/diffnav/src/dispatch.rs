//! Runs app tasks against the collaborator off the update loop

use crate::app::{FilesResult, LoadFailure, Message, Task};
use diffnav_core::{parse_diff, parse_untracked, Collaborator, DiffError, DiffFile};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// Spawns each task on the runtime's blocking pool under a time budget and
/// reports the outcome as a `Message`
pub struct Dispatcher {
    collaborator: Arc<dyn Collaborator>,
    handle: Handle,
    tx: UnboundedSender<Message>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        collaborator: Arc<dyn Collaborator>,
        handle: Handle,
        tx: UnboundedSender<Message>,
        timeout: Duration,
    ) -> Self {
        Self {
            collaborator,
            handle,
            tx,
            timeout,
        }
    }

    pub fn dispatch_all(&self, tasks: Vec<Task>) {
        for task in tasks {
            self.dispatch(task);
        }
    }

    /// Run `task` in the background and send its result message.
    ///
    /// A call that exceeds its budget is reported as a timeout right away. The
    /// blocking git process is not killed: it runs to completion on the blocking
    /// pool and its late result is dropped, so only one message is sent per task.
    pub fn dispatch(&self, task: Task) {
        let (task, budget) = match task {
            Task::WithTimeout { task, timeout } => (task.base().clone(), timeout),
            task => (task, self.timeout),
        };
        let collaborator = self.collaborator.clone();
        let tx = self.tx.clone();
        tracing::debug!(?task, ?budget, "dispatching");

        self.handle.spawn(async move {
            let job = task.clone();
            let blocking = tokio::task::spawn_blocking(move || run(collaborator.as_ref(), &job));
            let message = match tokio::time::timeout(budget, blocking).await {
                Ok(Ok(message)) => message,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, ?task, "task panicked");
                    task.failed(DiffError::git(format!("background task failed: {e}")))
                }
                Err(_) => {
                    tracing::warn!(?task, ?budget, "task timed out");
                    task.failed(DiffError::timeout(format!(
                        "{} did not finish within {:.1}s",
                        describe(&task),
                        budget.as_secs_f64()
                    )))
                }
            };
            if tx.send(message).is_err() {
                tracing::debug!("receiver dropped, result discarded");
            }
        });
    }
}

fn describe(task: &Task) -> &'static str {
    match task {
        Task::LoadWorking => "Loading the working tree diff",
        Task::LoadBranchName => "Reading the current branch",
        Task::LoadCommits { .. } => "Loading the commit log",
        Task::LoadBranches => "Listing branches",
        Task::LoadWorktrees => "Listing worktrees",
        Task::LoadPreview { .. } | Task::LoadCommitFiles { .. } => "Loading the commit diff",
        Task::WithTimeout { task, .. } => describe(task),
    }
}

/// Execute one task synchronously
pub fn run(collaborator: &dyn Collaborator, task: &Task) -> Message {
    match task {
        Task::LoadWorking => Message::WorkingLoaded(load_working(collaborator)),
        Task::LoadBranchName => Message::BranchNameLoaded(collaborator.current_branch()),
        Task::LoadCommits { reference, limit } => {
            let result = match reference {
                Some(reference) => collaborator.commit_log_for_ref(reference, *limit),
                None => collaborator.commit_log(*limit),
            };
            Message::CommitsLoaded {
                reference: reference.clone(),
                result,
            }
        }
        Task::LoadBranches => Message::BranchesLoaded(collaborator.branches()),
        Task::LoadWorktrees => Message::WorktreesLoaded(collaborator.worktrees()),
        Task::LoadPreview { hash } => Message::PreviewLoaded {
            hash: hash.clone(),
            result: load_commit(collaborator, hash),
        },
        Task::LoadCommitFiles { hash } => Message::CommitFilesLoaded {
            hash: hash.clone(),
            result: load_commit(collaborator, hash),
        },
        Task::WithTimeout { task, .. } => run(collaborator, task),
    }
}

fn parse_raw(raw: String) -> Result<Vec<DiffFile>, LoadFailure> {
    parse_diff(&raw).map_err(|error| LoadFailure {
        error,
        raw: Some(raw),
    })
}

fn load_commit(collaborator: &dyn Collaborator, hash: &str) -> FilesResult {
    let raw = collaborator.commit_diff(hash)?;
    let files = parse_raw(raw)?;
    tracing::info!(%hash, files = files.len(), "commit diff loaded");
    Ok(files.into())
}

/// Tracked changes plus untracked files; the untracked part is best effort
fn load_working(collaborator: &dyn Collaborator) -> FilesResult {
    let raw = collaborator.working_diff()?;
    let mut files = parse_raw(raw)?;

    match collaborator.untracked_files() {
        Ok(paths) => {
            for path in paths {
                let file = collaborator
                    .file_content(&path)
                    .and_then(|content| parse_untracked(&path, &content));
                match file {
                    Ok(file) => files.push(file),
                    Err(error) => tracing::warn!(%path, %error, "skipping untracked file"),
                }
            }
        }
        Err(error) => tracing::warn!(%error, "could not list untracked files"),
    }
    Ok(files.into())
}
