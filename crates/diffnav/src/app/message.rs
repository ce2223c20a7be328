use diffnav_core::{BranchEntry, CommitEntry, DiffError, DiffFile, WorktreeEntry};
use std::sync::Arc;
use std::time::Duration;

/// User intents, already decoded from key events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Left,
    Right,
    Cycle,
    Select,
    Back,
    NextSection,
    PrevSection,
    ToggleViewMode,
    Retry,
    Reload,
    ViewRaw,
    ToggleHelp,
    Quit,
}

/// A load that failed, with the unparsed output when parsing was the problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub error: DiffError,
    pub raw: Option<String>,
}

impl From<DiffError> for LoadFailure {
    fn from(error: DiffError) -> Self {
        Self { error, raw: None }
    }
}

pub type FilesResult = Result<Arc<[DiffFile]>, LoadFailure>;

/// Inputs to `App::update`: user actions and finished tasks
#[derive(Debug, Clone)]
pub enum Message {
    Action(Action),
    WorkingLoaded(FilesResult),
    BranchNameLoaded(Result<Option<String>, DiffError>),
    /// `reference` is `None` for the checked-out HEAD
    CommitsLoaded {
        reference: Option<String>,
        result: Result<Vec<CommitEntry>, DiffError>,
    },
    BranchesLoaded(Result<Vec<BranchEntry>, DiffError>),
    WorktreesLoaded(Result<Vec<WorktreeEntry>, DiffError>),
    PreviewLoaded {
        hash: String,
        result: FilesResult,
    },
    CommitFilesLoaded {
        hash: String,
        result: FilesResult,
    },
}

/// Collaborator work requested by `App::update`, run by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    LoadWorking,
    LoadBranchName,
    LoadCommits {
        reference: Option<String>,
        limit: usize,
    },
    LoadBranches,
    LoadWorktrees,
    LoadPreview {
        hash: String,
    },
    LoadCommitFiles {
        hash: String,
    },
    /// Run the inner task with a specific time budget
    WithTimeout {
        task: Box<Task>,
        timeout: Duration,
    },
}

impl Task {
    /// The task without any timeout override
    pub fn base(&self) -> &Task {
        match self {
            Task::WithTimeout { task, .. } => task.base(),
            task => task,
        }
    }

    /// The message reporting this task's failure
    pub fn failed(&self, error: DiffError) -> Message {
        match self {
            Task::LoadWorking => Message::WorkingLoaded(Err(error.into())),
            Task::LoadBranchName => Message::BranchNameLoaded(Err(error)),
            Task::LoadCommits { reference, .. } => Message::CommitsLoaded {
                reference: reference.clone(),
                result: Err(error),
            },
            Task::LoadBranches => Message::BranchesLoaded(Err(error)),
            Task::LoadWorktrees => Message::WorktreesLoaded(Err(error)),
            Task::LoadPreview { hash } => Message::PreviewLoaded {
                hash: hash.clone(),
                result: Err(error.into()),
            },
            Task::LoadCommitFiles { hash } => Message::CommitFilesLoaded {
                hash: hash.clone(),
                result: Err(error.into()),
            },
            Task::WithTimeout { task, .. } => task.failed(error),
        }
    }
}
