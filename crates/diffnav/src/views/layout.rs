//! Row geometry shared by the renderer and hunk navigation

use diffnav_core::DiffFile;

/// Rows taken by the commit metadata block above a commit preview
pub const COMMIT_HEADER_ROWS: usize = 6;
/// Path line plus rule above each file in aggregate views
pub const FILE_HEADER_ROWS: usize = 2;

/// Placement of one file inside the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    /// Index into the document's file list
    pub file: usize,
    /// First row of the block (the separator, when present)
    pub start: usize,
    pub body_start: usize,
    pub body_rows: usize,
    /// Row offset of each hunk header, relative to `body_start`
    pub hunk_starts: Vec<usize>,
}

impl FileBlock {
    /// Binary files and files without hunks render a single placeholder row
    pub fn is_placeholder(&self) -> bool {
        self.hunk_starts.is_empty()
    }

    /// Map a body offset to (hunk index, row within the hunk)
    pub fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        if self.hunk_starts.is_empty() || offset >= self.body_rows {
            return None;
        }
        let hunk = self.hunk_starts.partition_point(|&start| start <= offset) - 1;
        Some((hunk, offset - self.hunk_starts[hunk]))
    }
}

/// What a given row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    /// Line of the commit metadata block
    Commit(usize),
    Separator,
    FileHeader { block: usize },
    FileRule { block: usize },
    /// "Binary file differs" or "No content changes"
    Placeholder { block: usize },
    Body { block: usize, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    preamble: usize,
    aggregate: bool,
    blocks: Vec<FileBlock>,
    total: usize,
}

impl ContentLayout {
    /// Compute geometry from precounted rows per hunk (one entry per index)
    pub fn with_rows(
        files: &[DiffFile],
        indices: &[usize],
        hunk_rows: &[Vec<usize>],
        aggregate: bool,
        commit_header: bool,
    ) -> Self {
        let preamble = if commit_header { COMMIT_HEADER_ROWS } else { 0 };
        let mut row = preamble;
        let mut blocks = Vec::with_capacity(indices.len());

        for (pos, &file) in indices.iter().enumerate() {
            let start = row;
            if aggregate {
                if pos > 0 {
                    row += 1;
                }
                row += FILE_HEADER_ROWS;
            }
            let body_start = row;

            let is_binary = files.get(file).map(|f| f.is_binary).unwrap_or(false);
            let counts = hunk_rows.get(pos).map(Vec::as_slice).unwrap_or_default();
            let mut hunk_starts = Vec::new();
            let body_rows = if is_binary || counts.is_empty() {
                1
            } else {
                let mut offset = 0;
                for &count in counts {
                    hunk_starts.push(offset);
                    offset += count;
                }
                offset
            };
            row += body_rows;

            blocks.push(FileBlock {
                file,
                start,
                body_start,
                body_rows,
                hunk_starts,
            });
        }

        Self {
            preamble,
            aggregate,
            blocks,
            total: row,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn blocks(&self) -> &[FileBlock] {
        &self.blocks
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    /// Absolute rows of every hunk header, strictly increasing
    pub fn hunk_positions(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .flat_map(|block| {
                block
                    .hunk_starts
                    .iter()
                    .map(move |start| block.body_start + start)
            })
            .collect()
    }

    pub fn resolve(&self, row: usize) -> Option<RowRef> {
        if row >= self.total {
            return None;
        }
        if row < self.preamble {
            return Some(RowRef::Commit(row));
        }
        let idx = self.blocks.partition_point(|b| b.start <= row).checked_sub(1)?;
        let block = &self.blocks[idx];

        if row < block.body_start {
            let header_row = row - block.start;
            let separator = usize::from(idx > 0);
            return Some(match header_row.checked_sub(separator) {
                None => RowRef::Separator,
                Some(0) => RowRef::FileHeader { block: idx },
                Some(_) => RowRef::FileRule { block: idx },
            });
        }

        if block.is_placeholder() {
            return Some(RowRef::Placeholder { block: idx });
        }
        Some(RowRef::Body {
            block: idx,
            offset: row - block.body_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ViewMode;
    use diffnav_core::{align_hunk, parse_diff};

    fn layout_for(
        files: &[DiffFile],
        indices: &[usize],
        mode: ViewMode,
        aggregate: bool,
        commit_header: bool,
    ) -> ContentLayout {
        let hunk_rows: Vec<Vec<usize>> = indices
            .iter()
            .map(|&idx| {
                files[idx]
                    .hunks
                    .iter()
                    .map(|hunk| match mode {
                        ViewMode::Unified => hunk.lines.len(),
                        ViewMode::Split => align_hunk(hunk).len(),
                    })
                    .collect()
            })
            .collect();
        ContentLayout::with_rows(files, indices, &hunk_rows, aggregate, commit_header)
    }

    const TWO_FILES: &str = "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -1,2 +1,2 @@\n-x\n+y\n ctx\n@@ -10 +10 @@\n-p\n+q\ndiff --git a/img.png b/img.png\nBinary files a/img.png and b/img.png differ\ndiff --git a/c.rs b/c.rs\nold mode 100644\nnew mode 100755\n";

    #[test]
    fn test_single_file_is_body_only() {
        let files = parse_diff(TWO_FILES).expect("parse");
        let layout = layout_for(&files, &[0], ViewMode::Unified, false, false);
        assert_eq!(layout.total(), 7);
        assert_eq!(layout.hunk_positions(), vec![0, 4]);
        assert_eq!(layout.resolve(0), Some(RowRef::Body { block: 0, offset: 0 }));
        assert_eq!(layout.blocks()[0].locate(5), Some((1, 1)));
        assert_eq!(layout.resolve(7), None);
    }

    #[test]
    fn test_aggregate_rows() {
        let files = parse_diff(TWO_FILES).expect("parse");
        let layout = layout_for(&files, &[0, 1, 2], ViewMode::Unified, true, false);
        // a.rs: header(2) + body(7); img: sep + header(2) + 1; c.rs: sep + header(2) + 1
        assert_eq!(layout.total(), 9 + 4 + 4);
        assert_eq!(layout.hunk_positions(), vec![2, 6]);
        assert_eq!(layout.resolve(0), Some(RowRef::FileHeader { block: 0 }));
        assert_eq!(layout.resolve(1), Some(RowRef::FileRule { block: 0 }));
        assert_eq!(layout.resolve(9), Some(RowRef::Separator));
        assert_eq!(layout.resolve(10), Some(RowRef::FileHeader { block: 1 }));
        assert_eq!(layout.resolve(12), Some(RowRef::Placeholder { block: 1 }));
        assert_eq!(layout.resolve(16), Some(RowRef::Placeholder { block: 2 }));
    }

    #[test]
    fn test_commit_preamble_shifts_rows() {
        let files = parse_diff(TWO_FILES).expect("parse");
        let layout = layout_for(&files, &[0], ViewMode::Split, true, true);
        assert_eq!(layout.resolve(5), Some(RowRef::Commit(5)));
        assert_eq!(layout.resolve(6), Some(RowRef::FileHeader { block: 0 }));
        // split: header + modification + context, header + modification
        assert_eq!(layout.total(), 6 + 2 + 5);
        assert_eq!(layout.hunk_positions(), vec![8, 11]);
    }
}
