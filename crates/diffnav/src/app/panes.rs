//! The four render surfaces, as styled lines sized to the caller's area

use super::types::ViewKey;
use super::{App, CommitMode, CommitTab, Focus, Placeholder};
use crate::time_format::now_epoch;
use crate::views::commit_pane::{render_branches, render_commits, render_tabs, render_worktrees};
use crate::views::file_list::render_tree;
use crate::views::header::render_header;
use crate::views::scrollbar::scrollbar_lines;
use crate::views::status::{render_error, render_placeholder, render_raw};
use crate::views::style::{self, truncate};
use crate::views::{scrollbar, HeaderInfo};
use ratatui::text::{Line, Span};

impl App {
    pub fn render_file_list(&mut self, width: usize, height: usize) -> Vec<Line<'static>> {
        let focused = self.focus == Focus::FileList;
        let selected = self.file_selected;
        match self.working.as_mut() {
            Some(tree) if tree.is_empty() => render_placeholder(Placeholder::Empty, width, height),
            Some(tree) => render_tree(tree, selected, focused, width, height),
            None => render_placeholder(Placeholder::Loading, width, height),
        }
    }

    /// Tab strip plus the active list, or the file tree of a drilled-into commit
    pub fn render_commit_pane(&mut self, width: usize, height: usize) -> Vec<Line<'static>> {
        if height == 0 {
            return Vec::new();
        }
        let focused = self.focus == Focus::CommitPicker;
        let body = height - 1;

        if self.commit_mode == CommitMode::Files {
            let Some(files) = self.commit_files.as_mut() else {
                return Vec::new();
            };
            let short: String = files.hash.chars().take(7).collect();
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{short} "), style::accent()),
                Span::styled("files", style::bold()),
            ])];
            lines.extend(render_tree(&mut files.tree, files.selected, focused, width, body));
            return lines;
        }

        let mut lines = vec![render_tabs(self.active_tab, focused)];
        let rows = match self.active_tab {
            CommitTab::Commits if self.commits_loading => {
                render_placeholder(Placeholder::Loading, width, body)
            }
            CommitTab::Commits => render_commits(
                &self.commits,
                self.commit_selected,
                focused,
                &self.settings.time,
                now_epoch(),
                width,
                body,
            ),
            CommitTab::Branches => match &self.branches {
                Some(branches) => render_branches(branches, self.branch_selected, focused, width, body),
                None => render_placeholder(Placeholder::Loading, width, body),
            },
            CommitTab::Worktrees => match &self.worktrees {
                Some(worktrees) => {
                    render_worktrees(worktrees, self.worktree_selected, focused, width, body)
                }
                None => render_placeholder(Placeholder::Loading, width, body),
            },
        };
        lines.extend(rows);
        lines
    }

    pub fn render_header(&self, width: usize) -> Line<'static> {
        let info = HeaderInfo {
            branch: self.branch.clone(),
            title: self.view_title(),
            mode: self.view_mode,
            hunk: self.current_hunk().map(|(idx, count)| (idx + 1, count)),
            position: self.viewport.as_ref().map(|v| v.position()),
        };
        render_header(&info, width)
    }

    /// Error view, raw output, placeholder or the visible diff rows
    pub fn render_diff_pane(&mut self, width: usize, height: usize) -> Vec<Line<'static>> {
        if let Some(state) = &self.error {
            return match (&state.raw, self.show_raw) {
                (Some(raw), true) => render_raw(raw, self.raw_offset, height),
                _ => render_error(&state.error, width, height),
            };
        }
        match &self.viewport {
            Some(viewport) => viewport.render(&mut self.word_cache),
            None => render_placeholder(self.placeholder, width, height),
        }
    }

    /// Scrollbar column for the diff pane, when enabled and the content overflows
    pub fn render_scrollbar(&self) -> Option<Vec<Line<'static>>> {
        if !self.scrollbar_visible || self.error.is_some() {
            return None;
        }
        let viewport = self.viewport.as_ref()?;
        let cells = scrollbar(viewport.offset(), viewport.height(), viewport.total_lines())?;
        Some(scrollbar_lines(&cells))
    }

    fn view_title(&self) -> String {
        let Some(key) = &self.view_key else {
            return String::new();
        };
        match key {
            ViewKey::WorkingFile(path) => path.clone(),
            ViewKey::WorkingDir(node) => self
                .working
                .as_ref()
                .and_then(|tree| tree.node(*node))
                .map(|n| format!("{}/", n.path))
                .unwrap_or_default(),
            ViewKey::CommitPreview(hash) => {
                let subject = self
                    .selected_commit()
                    .filter(|c| &c.hash == hash)
                    .map(|c| c.subject.as_str())
                    .unwrap_or_default();
                format!("{} {subject}", truncate(hash, 7))
            }
            ViewKey::CommitFile { hash, file } => format!("{}:{file}", truncate(hash, 7)),
            ViewKey::CommitDir { hash, node } => {
                let dir = self
                    .commit_files
                    .as_ref()
                    .and_then(|f| f.tree.node(*node))
                    .map(|n| n.path.clone())
                    .unwrap_or_default();
                format!("{}:{dir}/", truncate(hash, 7))
            }
        }
    }
}
