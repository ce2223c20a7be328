//! Application state and logic

use crate::time_format::{now_epoch, TimeFormatter};
use crate::views::{CommitHeader, DiffDocument, DiffViewport, VirtualContent, VIRTUAL_THRESHOLD};
use diffnav_core::{BranchEntry, CommitEntry, DiffFile, FileTree, WordDiffCache, WorktreeEntry};
use std::sync::Arc;
use std::time::Duration;

mod message;
mod navigation;
mod panes;
mod scroll_cache;
mod types;
mod update;

pub use message::{Action, FilesResult, LoadFailure, Message, Task};
use scroll_cache::ScrollCache;
pub use types::{CommitMode, CommitTab, Focus, Placeholder, ViewMode};
use types::{CommitFiles, CommitPreview, ErrorState, ViewKey};

/// Startup options resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub view_mode: ViewMode,
    pub commit_limit: usize,
    pub virtual_threshold: usize,
    pub timeout: Duration,
    pub scrollbar: bool,
    pub file_panel_width: u16,
    pub time: TimeFormatter,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Unified,
            commit_limit: 100,
            virtual_threshold: VIRTUAL_THRESHOLD,
            timeout: Duration::from_secs(10),
            scrollbar: true,
            file_panel_width: 32,
            time: TimeFormatter::default(),
        }
    }
}

/// What the diff pane should show for the current state
enum Target {
    View(ViewKey, DiffDocument),
    Placeholder(Placeholder),
}

/// The main application state
pub struct App {
    pub focus: Focus,
    /// Left pane to return to when leaving the diff pane
    pub last_left_focus: Focus,
    pub commit_mode: CommitMode,
    pub active_tab: CommitTab,
    pub view_mode: ViewMode,
    /// Checked-out branch, `"HEAD"` when detached
    pub branch: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    pub scrollbar_visible: bool,
    settings: AppSettings,

    working: Option<FileTree>,
    file_selected: usize,

    commits: Vec<CommitEntry>,
    commits_loading: bool,
    /// Ref whose log is shown (or expected); `None` is HEAD
    commits_ref: Option<String>,
    commit_selected: usize,
    branches: Option<Vec<BranchEntry>>,
    branch_selected: usize,
    worktrees: Option<Vec<WorktreeEntry>>,
    worktree_selected: usize,

    preview: Option<CommitPreview>,
    pending_preview: Option<String>,
    commit_files: Option<CommitFiles>,
    pending_commit_files: Option<String>,

    viewport: Option<DiffViewport>,
    view_key: Option<ViewKey>,
    placeholder: Placeholder,
    diff_width: u16,
    diff_height: usize,
    word_cache: WordDiffCache,
    /// File list the word cache was filled from
    word_cache_files: Option<Arc<[DiffFile]>>,
    scroll_cache: ScrollCache,

    error: Option<ErrorState>,
    show_raw: bool,
    raw_offset: usize,
    retry_timeout: Duration,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            focus: Focus::FileList,
            last_left_focus: Focus::FileList,
            commit_mode: CommitMode::List,
            active_tab: CommitTab::Commits,
            view_mode: settings.view_mode,
            branch: None,
            show_help: false,
            should_quit: false,
            scrollbar_visible: settings.scrollbar,
            retry_timeout: settings.timeout,
            settings,
            working: None,
            file_selected: 0,
            commits: Vec::new(),
            commits_loading: false,
            commits_ref: None,
            commit_selected: 0,
            branches: None,
            branch_selected: 0,
            worktrees: None,
            worktree_selected: 0,
            preview: None,
            pending_preview: None,
            commit_files: None,
            pending_commit_files: None,
            viewport: None,
            view_key: None,
            placeholder: Placeholder::Loading,
            diff_width: 80,
            diff_height: 24,
            word_cache: WordDiffCache::new(),
            word_cache_files: None,
            scroll_cache: ScrollCache::default(),
            error: None,
            show_raw: false,
            raw_offset: 0,
        }
    }

    /// Open the viewer from scratch and request the initial loads
    pub fn show(&mut self) -> Vec<Task> {
        let settings = self.settings.clone();
        let (width, height) = (self.diff_width, self.diff_height);
        *self = Self::new(settings);
        self.diff_width = width;
        self.diff_height = height;
        self.scroll_cache.clear();

        let mut tasks = vec![Task::LoadWorking, Task::LoadBranchName];
        tasks.extend(self.request_commits(None));
        tracing::info!("viewer opened");
        tasks
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Left pane whose selection drives the diff pane
    pub fn left_context(&self) -> Focus {
        match self.focus {
            Focus::DiffPane => self.last_left_focus,
            focus => focus,
        }
    }

    pub fn viewport(&self) -> Option<&DiffViewport> {
        self.viewport.as_ref()
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        match self.viewport {
            Some(_) => None,
            None => Some(self.placeholder),
        }
    }

    pub fn selected_commit(&self) -> Option<&CommitEntry> {
        self.commits.get(self.commit_selected)
    }

    fn request_commits(&mut self, reference: Option<String>) -> Vec<Task> {
        let task = Task::LoadCommits {
            reference,
            limit: self.settings.commit_limit,
        };
        self.arm(&task);
        vec![task]
    }

    /// Record the key a task's result must match to be accepted
    fn arm(&mut self, task: &Task) {
        match task.base() {
            Task::LoadCommits { reference, .. } => {
                self.commits_ref = reference.clone();
                self.commits_loading = true;
            }
            Task::LoadPreview { hash } => self.pending_preview = Some(hash.clone()),
            Task::LoadCommitFiles { hash } => self.pending_commit_files = Some(hash.clone()),
            _ => {}
        }
    }

    /// Load the preview of the selected commit unless it is current or on its way
    fn ensure_preview(&mut self) -> Vec<Task> {
        if self.left_context() != Focus::CommitPicker
            || self.commit_mode != CommitMode::List
            || self.active_tab != CommitTab::Commits
        {
            return Vec::new();
        }
        let Some(hash) = self.selected_commit().map(|c| c.hash.clone()) else {
            return Vec::new();
        };
        let current = self.preview.as_ref().is_some_and(|p| p.hash == hash);
        let pending = self.pending_preview.as_deref() == Some(hash.as_str());
        if current || pending {
            return Vec::new();
        }
        let task = Task::LoadPreview { hash };
        self.clear_error_for(&task);
        self.arm(&task);
        vec![task]
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.show_raw = false;
        self.raw_offset = 0;
    }

    fn commit_header(&self, commit: &CommitEntry) -> CommitHeader {
        CommitHeader {
            hash: commit.hash.clone(),
            author: commit.author.clone(),
            date: self.settings.time.format(Some(commit.date), now_epoch()),
            subject: commit.subject.clone(),
        }
    }

    fn target(&mut self) -> Target {
        match self.left_context() {
            Focus::CommitPicker => self.commit_target(),
            _ => self.working_target(),
        }
    }

    fn working_target(&mut self) -> Target {
        let Some(tree) = self.working.as_mut() else {
            return Target::Placeholder(Placeholder::Loading);
        };
        tree_target(tree, self.file_selected, |file, _| ViewKey::WorkingFile(file), ViewKey::WorkingDir)
    }

    fn commit_target(&mut self) -> Target {
        if self.commit_mode == CommitMode::Files {
            let Some(files) = self.commit_files.as_mut() else {
                return Target::Placeholder(Placeholder::NoSelection);
            };
            let hash = files.hash.clone();
            let dir_hash = hash.clone();
            return tree_target(
                &mut files.tree,
                files.selected,
                |file, _| ViewKey::CommitFile {
                    hash: hash.clone(),
                    file,
                },
                |node| ViewKey::CommitDir {
                    hash: dir_hash.clone(),
                    node,
                },
            );
        }

        if self.active_tab != CommitTab::Commits {
            return Target::Placeholder(Placeholder::SelectRef);
        }
        if self.commits_loading {
            return Target::Placeholder(Placeholder::Loading);
        }
        let Some(commit) = self.selected_commit() else {
            return Target::Placeholder(Placeholder::Empty);
        };
        match &self.preview {
            Some(preview) if preview.hash == commit.hash => {
                if preview.files.is_empty() {
                    Target::Placeholder(Placeholder::Empty)
                } else {
                    let header = self.commit_header(commit);
                    Target::View(
                        ViewKey::CommitPreview(preview.hash.clone()),
                        DiffDocument::commit(preview.files.clone(), header),
                    )
                }
            }
            _ if self.pending_preview.as_deref() == Some(commit.hash.as_str()) => {
                Target::Placeholder(Placeholder::Loading)
            }
            _ => Target::Placeholder(Placeholder::NoSelection),
        }
    }

    /// Bring the diff pane in line with the current selection
    fn refresh_view(&mut self) {
        match self.target() {
            Target::Placeholder(placeholder) => {
                self.leave_view();
                self.placeholder = placeholder;
            }
            Target::View(key, doc) => {
                if self.viewport.is_some() && self.view_key.as_ref() == Some(&key) {
                    return;
                }
                self.leave_view();

                let same_files = self
                    .word_cache_files
                    .as_ref()
                    .is_some_and(|files| Arc::ptr_eq(files, &doc.files));
                if !same_files {
                    self.word_cache.clear();
                    self.word_cache_files = Some(doc.files.clone());
                }

                let content = VirtualContent::new(doc, self.view_mode, self.diff_width);
                let mut viewport = DiffViewport::new(
                    content,
                    self.diff_height,
                    self.settings.virtual_threshold,
                    &mut self.word_cache,
                );
                if let Some(file_key) = key.file_key() {
                    let offset = self.scroll_cache.restore(
                        file_key,
                        viewport.total_lines(),
                        self.diff_height,
                    );
                    viewport.set_offset(offset);
                }
                tracing::debug!(
                    ?key,
                    rows = viewport.total_lines(),
                    cached_offsets = self.scroll_cache.len(),
                    "diff view built"
                );
                self.viewport = Some(viewport);
                self.view_key = Some(key);
            }
        }
    }

    /// Drop the current view, remembering a single file's scroll offset
    fn leave_view(&mut self) {
        let viewport = self.viewport.take();
        let key = self.view_key.take();
        if let (Some(viewport), Some(key)) = (viewport, key) {
            if let Some(file_key) = key.file_key() {
                self.scroll_cache.save(file_key, viewport.offset());
            }
        }
    }

    /// Resize the diff pane; a width change rebuilds the view in place
    pub fn set_diff_area(&mut self, width: u16, height: usize) {
        let width_changed = width != self.diff_width;
        self.diff_width = width;
        self.diff_height = height;
        if let Some(viewport) = self.viewport.as_mut() {
            if width_changed {
                *viewport = viewport.rebuild(
                    self.view_mode,
                    width,
                    self.settings.virtual_threshold,
                    &mut self.word_cache,
                );
            }
            viewport.set_height(height);
        }
    }

    fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggle();
        if let Some(viewport) = self.viewport.as_mut() {
            *viewport = viewport.rebuild(
                self.view_mode,
                self.diff_width,
                self.settings.virtual_threshold,
                &mut self.word_cache,
            );
        }
    }
}

/// Single-file or aggregate target for the selected row of a tree
fn tree_target(
    tree: &mut FileTree,
    selected: usize,
    file_key: impl Fn(String, usize) -> ViewKey,
    dir_key: impl Fn(usize) -> ViewKey,
) -> Target {
    if tree.is_empty() {
        return Target::Placeholder(Placeholder::Empty);
    }
    let Some(&id) = tree.visible_nodes().get(selected) else {
        return Target::Placeholder(Placeholder::NoSelection);
    };
    let Some(node) = tree.node(id) else {
        return Target::Placeholder(Placeholder::NoSelection);
    };
    let files = tree.files().clone();
    match node.file {
        Some(idx) => {
            let key = files
                .get(idx)
                .map(|f| f.key().to_string())
                .unwrap_or_default();
            Target::View(file_key(key, idx), DiffDocument::single(files, idx))
        }
        None => Target::View(
            dir_key(id),
            DiffDocument::aggregate(files, tree.collect_files(id)),
        ),
    }
}

#[cfg(test)]
mod tests;
