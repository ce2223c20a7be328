use std::fmt::Write as _;
use std::sync::Arc;

use crate::app::ViewMode;
use crate::views::{DiffDocument, DiffViewport, ScrollPosition, VirtualContent, VIRTUAL_THRESHOLD};
use diffnav_core::{parse_diff, DiffFile, WordDiffCache};
use ratatui::{backend::TestBackend, buffer::Buffer, text::Line, widgets::Paragraph, Terminal};

/// One file whose unified view has exactly `rows` rows, in hunks of 10
fn diff_with_rows(rows: usize) -> Arc<[DiffFile]> {
    let mut text = String::from("diff --git a/big.rs b/big.rs\n--- a/big.rs\n+++ b/big.rs\n");
    let mut remaining = rows;
    let mut line_no = 1;
    while remaining > 0 {
        let hunk_rows = if remaining < 20 { remaining } else { 10 };
        let body: Vec<String> = (0..hunk_rows - 1)
            .map(|i| match i % 3 {
                0 => format!(" context {i}"),
                1 => format!("-old value {i}"),
                _ => format!("+new value {i}"),
            })
            .collect();
        let old_count = body.iter().filter(|l| !l.starts_with('+')).count();
        let new_count = body.iter().filter(|l| !l.starts_with('-')).count();
        let _ = writeln!(
            text,
            "@@ -{line_no},{old_count} +{line_no},{new_count} @@ fn f{line_no}()"
        );
        for line in body {
            let _ = writeln!(text, "{line}");
        }
        line_no += 100;
        remaining -= hunk_rows;
    }
    parse_diff(&text).expect("parse").into()
}

fn viewport(files: Arc<[DiffFile]>, mode: ViewMode, threshold: usize) -> DiffViewport {
    let content = VirtualContent::new(DiffDocument::single(files, 0), mode, 80);
    DiffViewport::new(content, 20, threshold, &mut WordDiffCache::new())
}

fn render_buffer(lines: Vec<Line<'static>>, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("terminal");
    terminal
        .draw(|frame| frame.render_widget(Paragraph::new(lines), frame.area()))
        .expect("draw");
    terminal.backend().buffer().clone()
}

#[test]
fn test_threshold_boundary() {
    let at = viewport(diff_with_rows(500), ViewMode::Unified, VIRTUAL_THRESHOLD);
    assert_eq!(at.total_lines(), 500);
    assert!(!at.is_virtual());

    let over = viewport(diff_with_rows(501), ViewMode::Unified, VIRTUAL_THRESHOLD);
    assert_eq!(over.total_lines(), 501);
    assert!(over.is_virtual());
}

#[test]
fn test_strategies_agree_on_hunks_and_rows() {
    let files = diff_with_rows(501);
    for mode in [ViewMode::Unified, ViewMode::Split] {
        let mut virtual_view = viewport(files.clone(), mode, VIRTUAL_THRESHOLD);
        let mut full_view = viewport(files.clone(), mode, usize::MAX);
        assert_eq!(virtual_view.is_virtual(), mode == ViewMode::Unified);
        assert!(!full_view.is_virtual());
        assert_eq!(
            virtual_view.layout().hunk_positions(),
            full_view.layout().hunk_positions()
        );

        let mut cache = WordDiffCache::new();
        for offset in [0, 137, 481, 10_000] {
            virtual_view.set_offset(offset);
            full_view.set_offset(offset);
            assert_eq!(virtual_view.offset(), full_view.offset());
            let a = render_buffer(virtual_view.render(&mut cache), 80, 20);
            let b = render_buffer(full_view.render(&mut cache), 80, 20);
            assert_eq!(a, b, "mode {mode:?} offset {offset}");
        }
    }
}

#[test]
fn test_hunk_positions_strictly_increasing() {
    let view = viewport(diff_with_rows(501), ViewMode::Unified, VIRTUAL_THRESHOLD);
    let positions = view.layout().hunk_positions();
    assert_eq!(positions[0], 0);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(positions.iter().all(|&p| p < view.total_lines()));
}

#[test]
fn test_scroll_clamps() {
    let mut view = viewport(diff_with_rows(100), ViewMode::Unified, VIRTUAL_THRESHOLD);
    assert_eq!(view.position(), ScrollPosition::Top);
    view.scroll_up(5);
    assert_eq!(view.offset(), 0);
    view.scroll_down(1_000);
    assert_eq!(view.offset(), 80);
    assert_eq!(view.position(), ScrollPosition::Bottom);
    view.scroll_up(40);
    assert_eq!(view.position(), ScrollPosition::Percent(50));
    view.goto_top();
    assert_eq!(view.offset(), 0);
    view.goto_bottom();
    assert_eq!(view.offset(), 80);
    assert_eq!(view.render(&mut WordDiffCache::new()).len(), 20);

    view.set_height(30);
    assert_eq!(view.offset(), 70);
}

#[test]
fn test_rebuild_preserves_clamped_offset() {
    let mut cache = WordDiffCache::new();
    let mut view = viewport(diff_with_rows(501), ViewMode::Unified, VIRTUAL_THRESHOLD);
    view.goto_bottom();
    assert_eq!(view.offset(), 481);

    let split = view.rebuild(ViewMode::Split, 80, VIRTUAL_THRESHOLD, &mut cache);
    assert!(split.total_lines() < 501);
    assert_eq!(split.offset(), split.max_offset());

    let mut view = viewport(diff_with_rows(501), ViewMode::Unified, VIRTUAL_THRESHOLD);
    view.set_offset(100);
    let narrow = view.rebuild(ViewMode::Unified, 40, VIRTUAL_THRESHOLD, &mut cache);
    assert_eq!(narrow.offset(), 100);
    assert_eq!(narrow.content().width(), 40);
}
