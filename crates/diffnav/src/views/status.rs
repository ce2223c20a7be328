//! Placeholder, error and raw-output views for the diff pane

use super::style::{self, truncate};
use crate::app::Placeholder;
use diffnav_core::{DiffError, RecoveryAction};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Key that triggers a recovery action
pub fn recovery_key(action: RecoveryAction) -> &'static str {
    match action {
        RecoveryAction::ViewRaw => "o",
        RecoveryAction::Retry | RecoveryAction::RetryLongerTimeout => "r",
        RecoveryAction::Reload => "R",
        RecoveryAction::Help => "?",
    }
}

pub fn render_placeholder(placeholder: Placeholder, width: usize, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default(); height / 3];
    let message = truncate(placeholder.message(), width);
    let pad = width.saturating_sub(message.chars().count()) / 2;
    lines.push(Line::styled(
        format!("{}{message}", " ".repeat(pad)),
        style::muted().add_modifier(Modifier::ITALIC),
    ));
    lines.truncate(height);
    lines
}

pub fn render_error(error: &DiffError, width: usize, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::styled(
            truncate(&format!(" ✗ {}", error.kind), width),
            Style::default().fg(style::ERROR).add_modifier(Modifier::BOLD),
        ),
    ];
    for text in error.message.lines() {
        lines.push(Line::raw(truncate(&format!("   {text}"), width)));
    }
    if let Some(help) = &error.help {
        lines.push(Line::default());
        lines.push(Line::styled(truncate(&format!("   {help}"), width), style::muted()));
    }
    lines.push(Line::default());
    for action in error.recovery_actions() {
        lines.push(Line::from(vec![
            Span::styled(format!("   [{}] ", recovery_key(action)), style::accent()),
            Span::raw(action.label()),
        ]));
    }
    lines.truncate(height);
    lines
}

/// Raw collaborator output starting at `offset`
pub fn render_raw(raw: &str, offset: usize, height: usize) -> Vec<Line<'static>> {
    raw.lines()
        .skip(offset)
        .take(height)
        .map(|line| Line::raw(style::expand_tabs(line)))
        .collect()
}
