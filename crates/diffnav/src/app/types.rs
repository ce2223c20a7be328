use diffnav_core::{DiffError, DiffFile, FileTree, NodeId};
use std::sync::Arc;

/// Which pane receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    FileList,
    CommitPicker,
    DiffPane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Browsing the commit, branch or worktree list
    List,
    /// Browsing the files of one commit
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTab {
    Commits,
    Branches,
    Worktrees,
}

impl CommitTab {
    pub const ALL: [CommitTab; 3] = [CommitTab::Commits, CommitTab::Branches, CommitTab::Worktrees];

    pub fn next(self) -> Self {
        match self {
            CommitTab::Commits => CommitTab::Branches,
            CommitTab::Branches => CommitTab::Worktrees,
            CommitTab::Worktrees => CommitTab::Commits,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            CommitTab::Commits => CommitTab::Worktrees,
            CommitTab::Branches => CommitTab::Commits,
            CommitTab::Worktrees => CommitTab::Branches,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CommitTab::Commits => "Commits",
            CommitTab::Branches => "Branches",
            CommitTab::Worktrees => "Worktrees",
        }
    }
}

/// View mode for displaying diffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One column with old and new lines interleaved
    #[default]
    Unified,
    /// Old on the left, new on the right
    Split,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Unified => ViewMode::Split,
            ViewMode::Split => ViewMode::Unified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Unified => "UNIFIED",
            ViewMode::Split => "SPLIT",
        }
    }
}

/// What the diff pane shows when there is no diff content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    Empty,
    NoSelection,
    SelectRef,
}

impl Placeholder {
    pub fn message(self) -> &'static str {
        match self {
            Placeholder::Loading => "Loading...",
            Placeholder::Empty => "No changes",
            Placeholder::NoSelection => "Nothing selected",
            Placeholder::SelectRef => "Select a branch or worktree to view its commits",
        }
    }
}

/// Identity of the diff pane's current view; a change triggers a rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewKey {
    WorkingFile(String),
    WorkingDir(NodeId),
    CommitPreview(String),
    CommitFile { hash: String, file: String },
    CommitDir { hash: String, node: NodeId },
}

impl ViewKey {
    /// Scroll cache key, for single-file views only
    pub(crate) fn file_key(&self) -> Option<&str> {
        match self {
            ViewKey::WorkingFile(key) => Some(key),
            ViewKey::CommitFile { file, .. } => Some(file),
            _ => None,
        }
    }
}

/// A loaded diff kept alive between views
#[derive(Debug, Clone)]
pub(crate) struct CommitPreview {
    pub(crate) hash: String,
    pub(crate) files: Arc<[DiffFile]>,
}

/// Files of a commit being browsed in `CommitMode::Files`
#[derive(Debug, Clone)]
pub(crate) struct CommitFiles {
    pub(crate) hash: String,
    pub(crate) tree: FileTree,
    pub(crate) selected: usize,
}

/// A failed load, with what is needed to retry it or show its raw output
#[derive(Debug, Clone)]
pub(crate) struct ErrorState {
    pub(crate) error: DiffError,
    pub(crate) raw: Option<String>,
    pub(crate) task: super::Task,
}
