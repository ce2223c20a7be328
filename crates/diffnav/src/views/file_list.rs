use super::style::{self, fit_spans};
use diffnav_core::FileTree;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// First row of a `height`-row window that keeps `selected` visible
pub fn window_start(selected: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        (selected + 1).saturating_sub(height)
    }
}

/// Tree rows with expand markers, status and per-node stats
pub fn render_tree(
    tree: &mut FileTree,
    selected: usize,
    focused: bool,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let visible = tree.visible_nodes().to_vec();
    let start = window_start(selected, height);

    visible
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .filter_map(|(row, &id)| {
            let node = tree.node(id)?;
            let indent = "  ".repeat(node.depth);
            let (additions, deletions) = tree.total_stats(id);

            let mut left = vec![Span::raw(indent)];
            if node.is_dir {
                let arrow = if node.expanded { "▾ " } else { "▸ " };
                left.push(Span::styled(arrow, style::muted()));
                left.push(Span::styled(format!("{}/", node.name), style::bold()));
            } else {
                let file = node.file.and_then(|idx| tree.files().get(idx));
                let marker = file.map(|f| f.status().marker()).unwrap_or(' ');
                let marker_style = match marker {
                    'A' | '?' => Style::default().fg(style::ADDED),
                    'D' => Style::default().fg(style::DELETED),
                    _ => style::accent(),
                };
                left.push(Span::styled(format!("{marker} "), marker_style));
                left.push(Span::raw(node.name.clone()));
            }

            let stats = format!(" +{additions} -{deletions}");
            let stats_width = stats.width();
            let mut spans = if width > stats_width + 4 {
                let mut spans = fit_spans(left, width - stats_width);
                spans.push(Span::styled(
                    format!(" +{additions}"),
                    Style::default().fg(style::ADDED),
                ));
                spans.push(Span::styled(
                    format!(" -{deletions}"),
                    Style::default().fg(style::DELETED),
                ));
                spans
            } else {
                fit_spans(left, width)
            };

            if row == selected {
                let highlight = style::selected(focused);
                for span in &mut spans {
                    span.style = span.style.patch(highlight);
                }
            }
            Some(Line::from(spans))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffnav_core::DiffFile;
    use std::sync::Arc;

    #[test]
    fn test_window_keeps_selection_visible() {
        assert_eq!(window_start(0, 10), 0);
        assert_eq!(window_start(9, 10), 0);
        assert_eq!(window_start(10, 10), 1);
        assert_eq!(window_start(5, 0), 0);
    }

    #[test]
    fn test_rows_show_tree_and_stats() {
        let files: Arc<[DiffFile]> = vec![DiffFile {
            old_path: "src/lib.rs".to_string(),
            new_path: "src/lib.rs".to_string(),
            additions: 3,
            deletions: 1,
            ..DiffFile::default()
        }]
        .into();
        let mut tree = FileTree::new(files);
        let lines = render_tree(&mut tree, 1, true, 30, 10);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text.len(), 2);
        assert!(text[0].starts_with("▾ src/"));
        assert!(text[1].starts_with("  M lib.rs"));
        assert!(text[1].ends_with(" +3 -1"));
        assert_eq!(text[1].width(), 30);
    }
}
