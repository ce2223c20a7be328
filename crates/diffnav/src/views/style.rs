//! Palette and text fitting helpers for the pane renderers

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ADDED: Color = Color::Green;
pub const DELETED: Color = Color::Red;
pub const ADDED_EMPHASIS_BG: Color = Color::Rgb(30, 80, 40);
pub const DELETED_EMPHASIS_BG: Color = Color::Rgb(100, 30, 35);
pub const HUNK: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const ACCENT: Color = Color::Yellow;
pub const ERROR: Color = Color::LightRed;

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn hunk() -> Style {
    Style::default().fg(HUNK)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn selected(focused: bool) -> Style {
    if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().bg(Color::Rgb(50, 50, 60))
    }
}

/// Expand tabs so that display width matches what the terminal draws
pub fn expand_tabs(text: &str) -> String {
    if text.contains('\t') {
        text.replace('\t', "    ")
    } else {
        text.to_string()
    }
}

/// Truncate a string to `width` display columns
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Truncate or pad spans so they occupy exactly `width` columns
pub fn fit_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let mut out = Vec::with_capacity(spans.len() + 1);
    let mut used = 0;
    for span in spans {
        if used >= width {
            break;
        }
        let span_width = span.content.width();
        if used + span_width <= width {
            used += span_width;
            out.push(span);
        } else {
            let text = truncate(&span.content, width - used);
            used += text.width();
            out.push(Span::styled(text, span.style));
        }
    }
    if used < width {
        out.push(Span::raw(" ".repeat(width - used)));
    }
    out
}

/// Shorten a path to fit a width, keeping the file name
pub fn truncate_path(path: &str, max_width: usize) -> String {
    if path.width() <= max_width {
        return path.to_string();
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    let short = format!(".../{name}");
    if short.width() <= max_width {
        short
    } else {
        truncate(name, max_width)
    }
}
