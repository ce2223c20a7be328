//! UI rendering for the TUI

use crate::app::{App, Focus};
use crate::views::style;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let panel_width = app.settings().file_panel_width.min(area.width / 2);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(panel_width), // File list and commit pane
            Constraint::Length(1),           // Separator
            Constraint::Min(0),              // Diff pane
        ])
        .split(area);

    draw_left_column(frame, app, chunks[0]);
    draw_separator(frame, app, chunks[1]);
    draw_diff_column(frame, app, chunks[2]);

    if app.show_help {
        draw_help_popover(frame);
    }
}

fn title_line(title: &str, focused: bool) -> Line<'static> {
    let title_style = if focused {
        style::accent().add_modifier(Modifier::BOLD)
    } else {
        style::muted()
    };
    Line::styled(format!(" {title}"), title_style)
}

fn draw_left_column(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Title
            Constraint::Percentage(50), // File list
            Constraint::Length(1),      // Rule
            Constraint::Min(0),         // Commit pane
        ])
        .split(area);

    let width = area.width as usize;
    frame.render_widget(
        Paragraph::new(title_line("Changes", app.focus == Focus::FileList)),
        chunks[0],
    );
    let files = app.render_file_list(width, chunks[1].height as usize);
    frame.render_widget(Paragraph::new(files), chunks[1]);

    frame.render_widget(
        Paragraph::new(Line::styled("─".repeat(width), style::muted())),
        chunks[2],
    );
    let commits = app.render_commit_pane(width, chunks[3].height as usize);
    frame.render_widget(Paragraph::new(commits), chunks[3]);
}

fn draw_separator(frame: &mut Frame, app: &App, area: Rect) {
    let fg = if app.focus == Focus::DiffPane {
        style::ACCENT
    } else {
        style::MUTED
    };
    let separator = "▏\n".repeat(area.height as usize);
    frame.render_widget(
        Paragraph::new(separator).style(Style::default().fg(fg)),
        area,
    );
}

fn draw_diff_column(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header line
            Constraint::Min(0),    // Diff body
        ])
        .split(area);

    let scrollbar_width = u16::from(app.scrollbar_visible);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(scrollbar_width)])
        .split(rows[1]);
    let body = columns[0];

    app.set_diff_area(body.width, body.height as usize);

    let header = app.render_header(rows[0].width as usize);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let lines = app.render_diff_pane(body.width as usize, body.height as usize);
    frame.render_widget(Paragraph::new(lines), body);

    if let Some(scrollbar) = app.render_scrollbar() {
        frame.render_widget(Paragraph::new(scrollbar), columns[1]);
    }
}

fn draw_help_popover(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 46u16.min(area.width.saturating_sub(4));
    let popup_height = 26u16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let key_style = style::accent();
    let section_style = style::hunk();
    let help_line = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {:<14}", key), key_style),
            Span::raw(desc.to_string()),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(" Navigation", section_style)),
        help_line("j / k / ↑↓", "Move selection / scroll"),
        help_line("h / l / ←→", "Move focus between panes"),
        help_line("Tab", "Cycle focus"),
        help_line("Enter", "Open file, toggle dir, drill in"),
        help_line("Esc / Bksp", "Back to commit list / quit"),
        help_line("^U / ^D", "Page up/down"),
        help_line("g / G", "Go to top/bottom"),
        Line::from(""),
        Line::from(Span::styled(" Sections", section_style)),
        help_line("] / n", "Next tab or next hunk"),
        help_line("[ / p / N", "Prev tab or prev hunk"),
        Line::from(""),
        Line::from(Span::styled(" View", section_style)),
        help_line("v", "Toggle unified/split"),
        help_line("r", "Retry failed load"),
        help_line("R", "Reload everything"),
        help_line("o", "View raw output"),
        Line::from(""),
        help_line("?", "Close help"),
        help_line("q", "Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(style::ACCENT));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppSettings, Message};
    use diffnav_core::parse_diff;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|f| draw(f, app)).expect("draw");
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draw_sizes_diff_pane() {
        let mut app = App::new(AppSettings::default());
        app.show();
        let text = "diff --git a/x.go b/x.go\n--- a/x.go\n+++ b/x.go\n@@ -1,2 +1,2 @@\n-old\n+new\n context\n";
        app.update(Message::WorkingLoaded(Ok(parse_diff(text).expect("parse").into())));

        let rendered = screen(&mut app, 100, 20);
        assert!(rendered.contains("Changes"));
        assert!(rendered.contains("Commits"));
        assert!(rendered.contains("+new"));

        let viewport = app.viewport().expect("view");
        // 100 - 32 panel - 1 separator - 1 scrollbar
        assert_eq!(viewport.content().width(), 66);
        assert_eq!(viewport.height(), 19);
    }

    #[test]
    fn test_help_popover() {
        let mut app = App::new(AppSettings::default());
        app.show_help = true;
        let rendered = screen(&mut app, 80, 30);
        assert!(rendered.contains(" Help "));
        assert!(rendered.contains("Toggle unified/split"));
    }
}
