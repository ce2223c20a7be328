//! The transition function: actions and task results in, tasks out

use super::types::{CommitFiles, CommitPreview, ErrorState, ViewKey};
use super::{Action, App, CommitMode, CommitTab, Focus, LoadFailure, Message, Task};
use diffnav_core::{ErrorKind, FileTree};
use std::mem::discriminant;

impl App {
    /// Apply one message and return the tasks it requests
    pub fn update(&mut self, message: Message) -> Vec<Task> {
        let tasks = match message {
            Message::Action(action) => self.handle_action(action),
            Message::WorkingLoaded(result) => {
                match result {
                    Ok(files) => {
                        tracing::info!(files = files.len(), "working diff loaded");
                        self.clear_error_for(&Task::LoadWorking);
                        self.invalidate_view(|key| {
                            matches!(key, ViewKey::WorkingFile(_) | ViewKey::WorkingDir(_))
                        });
                        self.working = Some(FileTree::new(files));
                    }
                    Err(failure) => self.set_error(failure, Task::LoadWorking),
                }
                Vec::new()
            }
            Message::BranchNameLoaded(result) => {
                match result {
                    Ok(name) => self.branch = Some(name.unwrap_or_else(|| "HEAD".to_string())),
                    Err(error) => tracing::warn!(%error, "could not read current branch"),
                }
                Vec::new()
            }
            Message::CommitsLoaded { reference, result } => {
                if reference != self.commits_ref {
                    tracing::debug!(?reference, "discarding stale commit log");
                    return self.finish(Vec::new());
                }
                self.commits_loading = false;
                match result {
                    Ok(commits) => {
                        tracing::info!(commits = commits.len(), ?reference, "commit log loaded");
                        self.clear_error_for(&Task::LoadCommits {
                            reference,
                            limit: self.settings.commit_limit,
                        });
                        self.commits = commits;
                        self.ensure_preview()
                    }
                    Err(error) => {
                        let task = Task::LoadCommits {
                            reference,
                            limit: self.settings.commit_limit,
                        };
                        self.set_error(error.into(), task);
                        Vec::new()
                    }
                }
            }
            Message::BranchesLoaded(result) => {
                match result {
                    Ok(branches) => {
                        self.clear_error_for(&Task::LoadBranches);
                        self.branch_selected =
                            self.branch_selected.min(branches.len().saturating_sub(1));
                        self.branches = Some(branches);
                    }
                    Err(error) => self.set_error(error.into(), Task::LoadBranches),
                }
                Vec::new()
            }
            Message::WorktreesLoaded(result) => {
                match result {
                    Ok(worktrees) => {
                        self.clear_error_for(&Task::LoadWorktrees);
                        self.worktree_selected =
                            self.worktree_selected.min(worktrees.len().saturating_sub(1));
                        self.worktrees = Some(worktrees);
                    }
                    Err(error) => self.set_error(error.into(), Task::LoadWorktrees),
                }
                Vec::new()
            }
            Message::PreviewLoaded { hash, result } => {
                if self.pending_preview.as_deref() != Some(hash.as_str()) {
                    tracing::debug!(%hash, "discarding stale commit preview");
                    return self.finish(Vec::new());
                }
                self.pending_preview = None;
                match result {
                    Ok(files) => self.preview = Some(CommitPreview { hash, files }),
                    Err(failure) => self.set_error(failure, Task::LoadPreview { hash }),
                }
                Vec::new()
            }
            Message::CommitFilesLoaded { hash, result } => {
                if self.pending_commit_files.as_deref() != Some(hash.as_str()) {
                    tracing::debug!(%hash, "discarding stale commit files");
                    return self.finish(Vec::new());
                }
                self.pending_commit_files = None;
                match result {
                    Ok(files) => {
                        self.invalidate_view(|key| {
                            matches!(key, ViewKey::CommitFile { .. } | ViewKey::CommitDir { .. })
                        });
                        self.commit_files = Some(CommitFiles {
                            hash,
                            tree: FileTree::new(files),
                            selected: 0,
                        });
                        self.commit_mode = CommitMode::Files;
                    }
                    Err(failure) => self.set_error(failure, Task::LoadCommitFiles { hash }),
                }
                Vec::new()
            }
        };
        self.finish(tasks)
    }

    fn finish(&mut self, tasks: Vec<Task>) -> Vec<Task> {
        self.clamp_selections();
        self.refresh_view();
        tasks
    }

    fn handle_action(&mut self, action: Action) -> Vec<Task> {
        if self.show_help {
            match action {
                Action::ToggleHelp | Action::Back => self.show_help = false,
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return Vec::new();
        }

        if self.show_raw {
            let max_offset = self.raw_max_offset();
            match action {
                Action::Up => self.raw_offset = self.raw_offset.saturating_sub(1),
                Action::Down => self.raw_offset = (self.raw_offset + 1).min(max_offset),
                Action::PageUp => self.raw_offset = self.raw_offset.saturating_sub(self.page_size()),
                Action::PageDown => {
                    self.raw_offset = (self.raw_offset + self.page_size()).min(max_offset)
                }
                Action::Top => self.raw_offset = 0,
                Action::Bottom => self.raw_offset = max_offset,
                Action::Back | Action::ViewRaw => {
                    self.show_raw = false;
                    self.raw_offset = 0;
                }
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return Vec::new();
        }

        match action {
            Action::Up | Action::Down => {
                self.move_selection(action == Action::Down);
                if self.focus == Focus::CommitPicker {
                    return self.ensure_preview();
                }
                Vec::new()
            }
            Action::PageUp => {
                self.scroll_by(self.page_size(), false);
                Vec::new()
            }
            Action::PageDown => {
                self.scroll_by(self.page_size(), true);
                Vec::new()
            }
            Action::Top => {
                self.scroll_to_top();
                Vec::new()
            }
            Action::Bottom => {
                self.scroll_to_bottom();
                Vec::new()
            }
            Action::Left => {
                match self.focus {
                    Focus::CommitPicker => {
                        self.focus = Focus::FileList;
                        self.last_left_focus = Focus::FileList;
                    }
                    Focus::DiffPane => self.focus = self.last_left_focus,
                    Focus::FileList => {}
                }
                Vec::new()
            }
            Action::Right => match self.focus {
                Focus::FileList => self.enter_commit_picker(),
                Focus::CommitPicker => {
                    self.enter_diff_pane();
                    Vec::new()
                }
                Focus::DiffPane => Vec::new(),
            },
            Action::Cycle => match self.focus {
                Focus::FileList => self.enter_commit_picker(),
                Focus::CommitPicker => {
                    self.enter_diff_pane();
                    Vec::new()
                }
                Focus::DiffPane => {
                    self.focus = Focus::FileList;
                    self.last_left_focus = Focus::FileList;
                    Vec::new()
                }
            },
            Action::Select => self.select(),
            Action::Back => {
                if self.commit_mode == CommitMode::Files && self.left_context() == Focus::CommitPicker
                {
                    self.commit_mode = CommitMode::List;
                    self.commit_files = None;
                    self.pending_commit_files = None;
                    self.focus = Focus::CommitPicker;
                    self.ensure_preview()
                } else {
                    self.should_quit = true;
                    Vec::new()
                }
            }
            Action::NextSection | Action::PrevSection => {
                let next = action == Action::NextSection;
                if self.focus == Focus::CommitPicker && self.commit_mode == CommitMode::List {
                    self.active_tab = if next {
                        self.active_tab.next()
                    } else {
                        self.active_tab.prev()
                    };
                    self.ensure_tab_data()
                } else {
                    if next {
                        self.next_hunk();
                    } else {
                        self.prev_hunk();
                    }
                    Vec::new()
                }
            }
            Action::ToggleViewMode => {
                self.toggle_view_mode();
                Vec::new()
            }
            Action::Retry => self.retry(),
            Action::Reload => self.reload(),
            Action::ViewRaw => {
                if self.error.as_ref().is_some_and(|e| e.raw.is_some()) {
                    self.show_raw = true;
                    self.raw_offset = 0;
                }
                Vec::new()
            }
            Action::ToggleHelp => {
                self.show_help = true;
                Vec::new()
            }
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    fn enter_commit_picker(&mut self) -> Vec<Task> {
        self.focus = Focus::CommitPicker;
        self.last_left_focus = Focus::CommitPicker;
        self.ensure_tab_data()
    }

    fn enter_diff_pane(&mut self) {
        if self.focus != Focus::DiffPane {
            self.last_left_focus = self.focus;
        }
        self.focus = Focus::DiffPane;
    }

    /// Request whatever the active tab needs that is not loaded yet
    fn ensure_tab_data(&mut self) -> Vec<Task> {
        if self.commit_mode != CommitMode::List {
            return Vec::new();
        }
        match self.active_tab {
            CommitTab::Commits => self.ensure_preview(),
            CommitTab::Branches if self.branches.is_none() => vec![Task::LoadBranches],
            CommitTab::Worktrees if self.worktrees.is_none() => vec![Task::LoadWorktrees],
            _ => Vec::new(),
        }
    }

    fn select(&mut self) -> Vec<Task> {
        match self.focus {
            Focus::DiffPane => Vec::new(),
            Focus::FileList => {
                let selected = self.file_selected;
                let opened = self
                    .working
                    .as_mut()
                    .is_some_and(|tree| select_node(tree, selected));
                if opened {
                    self.enter_diff_pane();
                }
                Vec::new()
            }
            Focus::CommitPicker => match self.commit_mode {
                CommitMode::Files => {
                    let opened = self
                        .commit_files
                        .as_mut()
                        .is_some_and(|files| select_node(&mut files.tree, files.selected));
                    if opened {
                        self.enter_diff_pane();
                    }
                    Vec::new()
                }
                CommitMode::List => self.select_list_row(),
            },
        }
    }

    fn select_list_row(&mut self) -> Vec<Task> {
        match self.active_tab {
            CommitTab::Commits => {
                let Some(hash) = self.selected_commit().map(|c| c.hash.clone()) else {
                    return Vec::new();
                };
                let task = Task::LoadCommitFiles { hash };
                self.arm(&task);
                vec![task]
            }
            CommitTab::Branches => {
                let reference = self
                    .branches
                    .as_ref()
                    .and_then(|b| b.get(self.branch_selected))
                    .map(|b| b.name.clone());
                self.switch_ref(reference)
            }
            CommitTab::Worktrees => {
                let reference = self
                    .worktrees
                    .as_ref()
                    .and_then(|w| w.get(self.worktree_selected))
                    .map(|w| {
                        if w.branch.is_empty() {
                            w.head.clone()
                        } else {
                            w.branch.clone()
                        }
                    });
                self.switch_ref(reference)
            }
        }
    }

    /// Show the log of another ref in the commits tab
    fn switch_ref(&mut self, reference: Option<String>) -> Vec<Task> {
        let Some(reference) = reference else {
            return Vec::new();
        };
        self.active_tab = CommitTab::Commits;
        self.commits.clear();
        self.commit_selected = 0;
        self.preview = None;
        self.pending_preview = None;
        self.request_commits(Some(reference))
    }

    fn retry(&mut self) -> Vec<Task> {
        let Some(state) = self.error.take() else {
            return Vec::new();
        };
        self.show_raw = false;
        let task = if state.error.kind == ErrorKind::Timeout {
            self.retry_timeout = self.retry_timeout.saturating_mul(2);
            tracing::info!(timeout = ?self.retry_timeout, "retrying with longer timeout");
            Task::WithTimeout {
                task: Box::new(state.task.base().clone()),
                timeout: self.retry_timeout,
            }
        } else {
            state.task
        };
        self.arm(&task);
        vec![task]
    }

    fn reload(&mut self) -> Vec<Task> {
        self.clear_error();
        self.preview = None;
        self.pending_preview = None;
        let mut tasks = vec![Task::LoadWorking, Task::LoadBranchName];
        tasks.extend(self.request_commits(self.commits_ref.clone()));
        if self.branches.is_some() {
            tasks.push(Task::LoadBranches);
        }
        if self.worktrees.is_some() {
            tasks.push(Task::LoadWorktrees);
        }
        if let Some(hash) = self.commit_files.as_ref().map(|f| f.hash.clone()) {
            let task = Task::LoadCommitFiles { hash };
            self.arm(&task);
            tasks.push(task);
        }
        tracing::info!(tasks = tasks.len(), "reloading");
        tasks
    }

    /// Last offset that still fills the diff pane with raw output
    fn raw_max_offset(&self) -> usize {
        let lines = self
            .error
            .as_ref()
            .and_then(|state| state.raw.as_deref())
            .map_or(0, |raw| raw.lines().count());
        lines.saturating_sub(self.diff_height)
    }

    fn set_error(&mut self, failure: LoadFailure, task: Task) {
        tracing::warn!(error = %failure.error, "load failed");
        self.error = Some(ErrorState {
            error: failure.error,
            raw: failure.raw,
            task,
        });
        self.show_raw = false;
        self.raw_offset = 0;
    }

    /// Clear the error if it came from the same kind of task
    pub(crate) fn clear_error_for(&mut self, task: &Task) {
        let same = self
            .error
            .as_ref()
            .is_some_and(|e| discriminant(e.task.base()) == discriminant(task.base()));
        if same {
            self.clear_error();
        }
    }

    /// Drop the current view if it shows data about to be replaced
    fn invalidate_view(&mut self, affected: impl Fn(&ViewKey) -> bool) {
        if self.view_key.as_ref().is_some_and(affected) {
            self.leave_view();
        }
    }
}

/// Toggle a directory row; report whether the row is a file to open
fn select_node(tree: &mut FileTree, selected: usize) -> bool {
    let Some(&id) = tree.visible_nodes().get(selected) else {
        return false;
    };
    let is_dir = tree.node(id).is_some_and(|n| n.is_dir);
    if is_dir {
        tree.toggle(id);
        false
    } else {
        true
    }
}
