use super::style::{self, truncate_path};
use super::viewport::ScrollPosition;
use crate::app::ViewMode;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Everything the header line reports about the diff pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub branch: Option<String>,
    /// Path, directory or commit being shown
    pub title: String,
    pub mode: ViewMode,
    /// (1-based current hunk, hunk count)
    pub hunk: Option<(usize, usize)>,
    pub position: Option<ScrollPosition>,
}

pub fn render_header(info: &HeaderInfo, width: usize) -> Line<'static> {
    let mode = format!(" {} ", info.mode.label());
    let mut right = String::new();
    if let Some((current, count)) = info.hunk {
        right.push_str(&format!(" hunk {current}/{count}"));
    }
    if let Some(position) = info.position {
        right.push_str(&format!(" {}", position.label()));
    }
    let branch = info
        .branch
        .as_ref()
        .map(|name| format!(" {name} "))
        .unwrap_or_default();

    let fixed = mode.width() + branch.width() + right.width() + 1;
    let title = truncate_path(&info.title, width.saturating_sub(fixed));
    let pad = width.saturating_sub(fixed + title.width());

    Line::from(vec![
        Span::styled(
            mode,
            Style::default()
                .fg(Color::Black)
                .bg(style::HUNK)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(branch, style::accent()),
        Span::raw(" "),
        Span::styled(title, style::bold()),
        Span::raw(" ".repeat(pad)),
        Span::styled(right, style::muted()),
    ])
}
