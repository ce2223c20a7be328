use super::file_list::window_start;
use super::style::{self, fit_spans, truncate};
use crate::app::CommitTab;
use crate::time_format::TimeFormatter;
use diffnav_core::{BranchEntry, CommitEntry, WorktreeEntry};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Tab strip; inactive tabs are dimmed when tabs cannot be switched
pub fn render_tabs(active: CommitTab, switchable: bool) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, tab) in CommitTab::ALL.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" │ ", style::muted()));
        }
        let tab_style = if *tab == active {
            style::accent().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else if switchable {
            Style::default()
        } else {
            style::muted()
        };
        spans.push(Span::styled(tab.label(), tab_style));
    }
    Line::from(spans)
}

fn highlight(mut spans: Vec<Span<'static>>, is_selected: bool, focused: bool) -> Line<'static> {
    if is_selected {
        let selected = style::selected(focused);
        for span in &mut spans {
            span.style = span.style.patch(selected);
        }
    }
    Line::from(spans)
}

pub fn render_commits(
    commits: &[CommitEntry],
    selected: usize,
    focused: bool,
    formatter: &TimeFormatter,
    now: i64,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let start = window_start(selected, height);
    commits
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(idx, commit)| {
            let marker = if commit.pushed {
                Span::raw("  ")
            } else {
                Span::styled("↑ ", style::accent())
            };
            let date = format!(" {}", formatter.format(Some(commit.date), now));
            let left = vec![
                marker,
                Span::styled(format!("{} ", commit.short_hash), style::accent()),
                Span::raw(commit.subject.clone()),
            ];
            let spans = if width > date.width() + 12 {
                let mut spans = fit_spans(left, width - date.width());
                spans.push(Span::styled(date, style::muted()));
                spans
            } else {
                fit_spans(left, width)
            };
            highlight(spans, idx == selected, focused)
        })
        .collect()
}

pub fn render_branches(
    branches: &[BranchEntry],
    selected: usize,
    focused: bool,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let start = window_start(selected, height);
    branches
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(idx, branch)| {
            let (marker, name_style) = if branch.is_current {
                ("* ", Style::default().fg(style::ADDED).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };
            let spans = fit_spans(
                vec![
                    Span::styled(marker, Style::default().fg(style::ADDED)),
                    Span::styled(branch.name.clone(), name_style),
                ],
                width,
            );
            highlight(spans, idx == selected, focused)
        })
        .collect()
}

pub fn render_worktrees(
    worktrees: &[WorktreeEntry],
    selected: usize,
    focused: bool,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let start = window_start(selected, height);
    worktrees
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(idx, worktree)| {
            let label = if worktree.branch.is_empty() {
                format!("({})", truncate(&worktree.head, 8))
            } else {
                worktree.branch.clone()
            };
            let spans = fit_spans(
                vec![
                    Span::styled(format!("{label} "), style::accent()),
                    Span::styled(worktree.path.clone(), style::muted()),
                ],
                width,
            );
            highlight(spans, idx == selected, focused)
        })
        .collect()
}
