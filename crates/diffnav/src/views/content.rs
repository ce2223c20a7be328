//! Displayable diff content and per-row rendering

use super::layout::{ContentLayout, RowRef};
use super::style::{self, expand_tabs, fit_spans};
use crate::app::ViewMode;
use diffnav_core::{
    align_hunk, DiffFile, DiffLine, LineKind, LinePair, PairKind, SegmentKind, WordDiffCache,
};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::sync::Arc;

/// Commit metadata shown above a commit preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub hash: String,
    pub author: String,
    /// Already formatted for display
    pub date: String,
    pub subject: String,
}

/// The files a diff pane shows and how they are framed
#[derive(Debug, Clone)]
pub struct DiffDocument {
    pub files: Arc<[DiffFile]>,
    pub indices: Vec<usize>,
    pub aggregate: bool,
    pub commit: Option<CommitHeader>,
}

impl DiffDocument {
    pub fn single(files: Arc<[DiffFile]>, index: usize) -> Self {
        Self {
            files,
            indices: vec![index],
            aggregate: false,
            commit: None,
        }
    }

    pub fn aggregate(files: Arc<[DiffFile]>, indices: Vec<usize>) -> Self {
        Self {
            files,
            indices,
            aggregate: true,
            commit: None,
        }
    }

    pub fn commit(files: Arc<[DiffFile]>, header: CommitHeader) -> Self {
        let indices = (0..files.len()).collect();
        Self {
            files,
            indices,
            aggregate: true,
            commit: Some(header),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitRow {
    hunk: usize,
    pair: LinePair,
}

/// Row-addressable content: geometry plus, in split mode, the flat pair list
#[derive(Debug, Clone)]
pub struct VirtualContent {
    doc: DiffDocument,
    mode: ViewMode,
    width: u16,
    layout: ContentLayout,
    split_rows: Vec<SplitRow>,
    /// First `split_rows` entry of each file block
    split_offsets: Vec<usize>,
}

impl VirtualContent {
    pub fn new(doc: DiffDocument, mode: ViewMode, width: u16) -> Self {
        let mut hunk_rows = Vec::with_capacity(doc.indices.len());
        let mut split_rows = Vec::new();
        let mut split_offsets = Vec::new();

        for &idx in &doc.indices {
            let Some(file) = doc.files.get(idx) else {
                hunk_rows.push(Vec::new());
                split_offsets.push(split_rows.len());
                continue;
            };
            split_offsets.push(split_rows.len());
            let counts = file
                .hunks
                .iter()
                .enumerate()
                .map(|(hunk_idx, hunk)| match mode {
                    ViewMode::Unified => hunk.lines.len(),
                    ViewMode::Split => {
                        let pairs = align_hunk(hunk);
                        let count = pairs.len();
                        split_rows.extend(pairs.into_iter().map(|pair| SplitRow {
                            hunk: hunk_idx,
                            pair,
                        }));
                        count
                    }
                })
                .collect();
            hunk_rows.push(counts);
        }

        let layout = ContentLayout::with_rows(
            &doc.files,
            &doc.indices,
            &hunk_rows,
            doc.aggregate,
            doc.commit.is_some(),
        );
        Self {
            doc,
            mode,
            width,
            layout,
            split_rows,
            split_offsets,
        }
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn total_lines(&self) -> usize {
        self.layout.total()
    }

    /// Same document under a different mode or width
    pub fn rebuilt(&self, mode: ViewMode, width: u16) -> Self {
        Self::new(self.doc.clone(), mode, width)
    }

    fn block_file(&self, block: usize) -> Option<&DiffFile> {
        let idx = self.layout.blocks().get(block)?.file;
        self.doc.files.get(idx)
    }

    pub fn render_row(&self, row: usize, cache: &mut WordDiffCache) -> Line<'static> {
        let Some(row_ref) = self.layout.resolve(row) else {
            return Line::default();
        };
        match row_ref {
            RowRef::Commit(line) => self.commit_row(line),
            RowRef::Separator => Line::default(),
            RowRef::FileHeader { block } => match self.block_file(block) {
                Some(file) => file_header(file),
                None => Line::default(),
            },
            RowRef::FileRule { .. } => Line::styled(
                "─".repeat(usize::from(self.width).max(1)),
                style::muted(),
            ),
            RowRef::Placeholder { block } => {
                let text = match self.block_file(block) {
                    Some(file) if file.is_binary => "Binary file differs",
                    _ => "No content changes",
                };
                Line::styled(text, style::muted().add_modifier(Modifier::ITALIC))
            }
            RowRef::Body { block, offset } => match self.mode {
                ViewMode::Unified => self.unified_row(block, offset, cache),
                ViewMode::Split => self.split_row(block, offset, cache),
            },
        }
    }

    fn commit_row(&self, line: usize) -> Line<'static> {
        let Some(commit) = self.doc.commit.as_ref() else {
            return Line::default();
        };
        match line {
            0 => Line::styled(format!("commit {}", commit.hash), style::accent()),
            1 => Line::raw(format!("Author: {}", commit.author)),
            2 => Line::raw(format!("Date:   {}", commit.date)),
            4 => Line::styled(format!("    {}", commit.subject), style::bold()),
            _ => Line::default(),
        }
    }

    fn unified_row(&self, block: usize, offset: usize, cache: &mut WordDiffCache) -> Line<'static> {
        let Some(file) = self.block_file(block) else {
            return Line::default();
        };
        let Some((hunk_idx, line_idx)) = self.layout.blocks()[block].locate(offset) else {
            return Line::default();
        };
        let Some(line) = file.hunks.get(hunk_idx).and_then(|h| h.lines.get(line_idx)) else {
            return Line::default();
        };

        if line.kind == LineKind::HunkHeader {
            return Line::from(vec![
                Span::styled(" ".repeat(12), style::muted()),
                Span::styled(expand_tabs(&line.content), style::hunk()),
            ]);
        }

        let mut spans = vec![Span::styled(
            format!(
                "{:>5} {:>5} ",
                line_number(line.old_line_num),
                line_number(line.new_line_num)
            ),
            style::muted(),
        )];
        spans.push(Span::styled(sign(line.kind), line_style(line.kind)));
        spans.extend(content_spans(file, hunk_idx, line_idx, line, cache));
        Line::from(spans)
    }

    fn split_row(&self, block: usize, offset: usize, cache: &mut WordDiffCache) -> Line<'static> {
        let Some(file) = self.block_file(block) else {
            return Line::default();
        };
        let Some(row) = self
            .split_offsets
            .get(block)
            .and_then(|start| self.split_rows.get(start + offset))
        else {
            return Line::default();
        };
        let Some(hunk) = file.hunks.get(row.hunk) else {
            return Line::default();
        };

        if row.pair.kind == PairKind::Header {
            let header = row
                .pair
                .left
                .and_then(|idx| hunk.lines.get(idx))
                .map(|line| expand_tabs(&line.content))
                .unwrap_or_default();
            return Line::from(vec![
                Span::styled(" ".repeat(6), style::muted()),
                Span::styled(header, style::hunk()),
            ]);
        }

        let width = usize::from(self.width);
        let left_width = width.saturating_sub(1) / 2;
        let right_width = width.saturating_sub(1 + left_width);

        let mut spans = self.split_cell(file, row.hunk, row.pair.left, Side::Old, left_width, cache);
        spans.push(Span::styled("│", style::muted()));
        spans.extend(self.split_cell(file, row.hunk, row.pair.right, Side::New, right_width, cache));
        Line::from(spans)
    }

    fn split_cell(
        &self,
        file: &DiffFile,
        hunk_idx: usize,
        line_idx: Option<usize>,
        side: Side,
        width: usize,
        cache: &mut WordDiffCache,
    ) -> Vec<Span<'static>> {
        let line = line_idx.and_then(|idx| {
            file.hunks
                .get(hunk_idx)
                .and_then(|h| h.lines.get(idx))
                .map(|line| (idx, line))
        });
        let Some((idx, line)) = line else {
            return fit_spans(Vec::new(), width);
        };

        let number = match side {
            Side::Old => line.old_line_num,
            Side::New => line.new_line_num,
        };
        let mut spans = vec![
            Span::styled(format!("{:>5} ", line_number(number)), style::muted()),
            Span::styled(sign(line.kind), line_style(line.kind)),
        ];
        spans.extend(content_spans(file, hunk_idx, idx, line, cache));
        fit_spans(spans, width)
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Old,
    New,
}

fn line_number(num: usize) -> String {
    if num == 0 {
        String::new()
    } else {
        num.to_string()
    }
}

fn sign(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Addition => "+",
        LineKind::Deletion => "-",
        _ => " ",
    }
}

fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Addition => Style::default().fg(style::ADDED),
        LineKind::Deletion => Style::default().fg(style::DELETED),
        LineKind::HunkHeader => style::hunk(),
        LineKind::Context => Style::default(),
    }
}

fn content_spans(
    file: &DiffFile,
    hunk_idx: usize,
    line_idx: usize,
    line: &DiffLine,
    cache: &mut WordDiffCache,
) -> Vec<Span<'static>> {
    let base = line_style(line.kind);
    let Some(segments) = cache.segments(file, hunk_idx, line_idx, line.kind) else {
        return vec![Span::styled(expand_tabs(&line.content), base)];
    };
    let emphasis_bg = match line.kind {
        LineKind::Addition => style::ADDED_EMPHASIS_BG,
        _ => style::DELETED_EMPHASIS_BG,
    };
    segments
        .iter()
        .map(|segment| {
            let style = match segment.kind {
                SegmentKind::Unchanged => base,
                SegmentKind::Added | SegmentKind::Deleted => {
                    base.bg(emphasis_bg).add_modifier(Modifier::BOLD)
                }
            };
            Span::styled(expand_tabs(&segment.text), style)
        })
        .collect()
}

fn file_header(file: &DiffFile) -> Line<'static> {
    let status = file.status();
    let status_style = match status.marker() {
        'A' | '?' => Style::default().fg(style::ADDED),
        'D' => Style::default().fg(style::DELETED),
        _ => style::accent(),
    };
    let path = if file.is_renamed && file.old_path != file.new_path {
        format!("{} → {}", file.old_path, file.new_path)
    } else {
        file.display_path().to_string()
    };
    Line::from(vec![
        Span::styled(format!("{} ", status.marker()), status_style),
        Span::styled(path, style::bold()),
        Span::raw("  "),
        Span::styled(
            format!("+{}", file.additions),
            Style::default().fg(style::ADDED),
        ),
        Span::raw(" "),
        Span::styled(
            format!("-{}", file.deletions),
            Style::default().fg(style::DELETED),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffnav_core::parse_diff;

    const DIFF: &str = "diff --git a/x.go b/x.go\n--- a/x.go\n+++ b/x.go\n@@ -1,2 +1,2 @@\n-old\n+new\n context\n";

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn content(mode: ViewMode) -> VirtualContent {
        let files: Arc<[DiffFile]> = parse_diff(DIFF).expect("parse").into();
        VirtualContent::new(DiffDocument::single(files, 0), mode, 41)
    }

    #[test]
    fn test_unified_rows() {
        let content = content(ViewMode::Unified);
        let mut cache = WordDiffCache::new();
        assert_eq!(content.total_lines(), 4);
        assert!(text(&content.render_row(0, &mut cache)).contains("@@ -1,2 +1,2 @@"));
        assert_eq!(text(&content.render_row(1, &mut cache)), "    1       -old");
        assert_eq!(text(&content.render_row(2, &mut cache)), "          1 +new");
        assert_eq!(text(&content.render_row(3, &mut cache)), "    2     2  context");
    }

    #[test]
    fn test_split_rows() {
        let content = content(ViewMode::Split);
        let mut cache = WordDiffCache::new();
        assert_eq!(content.total_lines(), 3);
        let row = text(&content.render_row(1, &mut cache));
        let (left, right) = row.split_once('│').expect("divider");
        assert_eq!(left.trim_end(), "    1 -old");
        assert_eq!(right.trim_end(), "    1 +new");
        assert_eq!(left.chars().count(), 20);
        assert_eq!(right.chars().count(), 20);
    }

    #[test]
    fn test_word_emphasis_on_changed_segments() {
        let files: Arc<[DiffFile]> = parse_diff(
            "diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-let a = 1;\n+let a = 2;\n",
        )
        .expect("parse")
        .into();
        let content = VirtualContent::new(DiffDocument::single(files, 0), ViewMode::Unified, 80);
        let mut cache = WordDiffCache::new();
        let line = content.render_row(2, &mut cache);
        let emphasized: Vec<&str> = line
            .spans
            .iter()
            .filter(|s| s.style.add_modifier.contains(Modifier::BOLD))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(emphasized, vec!["2"]);
    }

    #[test]
    fn test_commit_and_placeholder_rows() {
        let files: Arc<[DiffFile]> = parse_diff(
            "diff --git a/logo.png b/logo.png\nBinary files a/logo.png and b/logo.png differ\n",
        )
        .expect("parse")
        .into();
        let header = CommitHeader {
            hash: "abc123".to_string(),
            author: "Ada".to_string(),
            date: "today".to_string(),
            subject: "Add logo".to_string(),
        };
        let content = VirtualContent::new(DiffDocument::commit(files, header), ViewMode::Unified, 30);
        let mut cache = WordDiffCache::new();
        let rows: Vec<String> = (0..content.total_lines())
            .map(|row| text(&content.render_row(row, &mut cache)))
            .collect();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0], "commit abc123");
        assert_eq!(rows[4], "    Add logo");
        assert!(rows[6].contains("logo.png"));
        assert_eq!(rows[8], "Binary file differs");
    }
}
