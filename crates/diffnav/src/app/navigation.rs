//! Cursor movement, scrolling and hunk navigation

use super::{App, CommitMode, CommitTab, Focus};

/// First position strictly after `offset`, wrapping to the first one
pub(crate) fn next_position(positions: &[usize], offset: usize) -> Option<usize> {
    positions
        .iter()
        .copied()
        .find(|&p| p > offset)
        .or_else(|| positions.first().copied())
}

/// Last position strictly before `offset`, wrapping to the last one
pub(crate) fn prev_position(positions: &[usize], offset: usize) -> Option<usize> {
    positions
        .iter()
        .rev()
        .copied()
        .find(|&p| p < offset)
        .or_else(|| positions.last().copied())
}

/// Index of the last position at or before `offset`
pub(crate) fn current_position(positions: &[usize], offset: usize) -> Option<usize> {
    positions.iter().rposition(|&p| p <= offset)
}

fn step(selected: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (selected + 1).min(len - 1)
    } else {
        selected.saturating_sub(1)
    }
}

impl App {
    pub fn hunk_positions(&self) -> Vec<usize> {
        self.viewport
            .as_ref()
            .map(|v| v.layout().hunk_positions())
            .unwrap_or_default()
    }

    /// Jump to the next hunk. When the next hunk sits in the final screen
    /// the clamped offset would not move, so wrap to the first one instead.
    pub fn next_hunk(&mut self) {
        let positions = self.hunk_positions();
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        let offset = viewport.offset();
        let Some(target) = next_position(&positions, offset) else {
            return;
        };
        viewport.set_offset(target);
        if viewport.offset() == offset {
            if let Some(&first) = positions.first() {
                viewport.set_offset(first);
            }
        }
    }

    pub fn prev_hunk(&mut self) {
        let positions = self.hunk_positions();
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        if let Some(target) = prev_position(&positions, viewport.offset()) {
            viewport.set_offset(target);
        }
    }

    /// `(index, count)` of the hunk at the top of the window
    pub fn current_hunk(&self) -> Option<(usize, usize)> {
        let viewport = self.viewport.as_ref()?;
        let positions = viewport.layout().hunk_positions();
        let idx = current_position(&positions, viewport.offset())?;
        Some((idx, positions.len()))
    }

    pub(crate) fn scroll_by(&mut self, lines: usize, down: bool) {
        if let Some(viewport) = self.viewport.as_mut() {
            if down {
                viewport.scroll_down(lines);
            } else {
                viewport.scroll_up(lines);
            }
        }
    }

    pub(crate) fn page_size(&self) -> usize {
        self.diff_height.saturating_sub(1).max(1)
    }

    pub(crate) fn scroll_to_top(&mut self) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.goto_top();
        }
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.goto_bottom();
        }
    }

    /// Move the selection of the focused list by one row
    pub(crate) fn move_selection(&mut self, down: bool) {
        match self.focus {
            Focus::DiffPane => self.scroll_by(1, down),
            Focus::FileList => {
                if let Some(tree) = self.working.as_mut() {
                    let len = tree.visible_nodes().len();
                    self.file_selected = step(self.file_selected, len, down);
                }
            }
            Focus::CommitPicker => match self.commit_mode {
                CommitMode::Files => {
                    if let Some(files) = self.commit_files.as_mut() {
                        let len = files.tree.visible_nodes().len();
                        files.selected = step(files.selected, len, down);
                    }
                }
                CommitMode::List => match self.active_tab {
                    CommitTab::Commits => {
                        self.commit_selected = step(self.commit_selected, self.commits.len(), down);
                    }
                    CommitTab::Branches => {
                        let len = self.branches.as_ref().map_or(0, Vec::len);
                        self.branch_selected = step(self.branch_selected, len, down);
                    }
                    CommitTab::Worktrees => {
                        let len = self.worktrees.as_ref().map_or(0, Vec::len);
                        self.worktree_selected = step(self.worktree_selected, len, down);
                    }
                },
            },
        }
    }

    /// Keep tree selections inside the visible rows after a collapse or reload
    pub(crate) fn clamp_selections(&mut self) {
        if let Some(tree) = self.working.as_mut() {
            self.file_selected = tree.clamp_index(self.file_selected);
        }
        if let Some(files) = self.commit_files.as_mut() {
            files.selected = files.tree.clamp_index(files.selected);
        }
        self.commit_selected = self.commit_selected.min(self.commits.len().saturating_sub(1));
    }
}
