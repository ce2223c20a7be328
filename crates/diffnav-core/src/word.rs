//! Intra-line word diff for paired deletion and addition lines

use crate::parser::{DiffFile, Hunk, LineKind};
use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Lines longer than this (in bytes) are shown without word highlighting
pub const MAX_WORD_DIFF_LINE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Unchanged,
    Added,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSegment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Word and punctuation tokens of a line, whitespace runs included
struct Words<'a>(&'a str);

impl<'a> TokenSource for Words<'a> {
    type Token = &'a str;
    type Tokenizer = unicode_segmentation::UWordBounds<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.split_word_bounds()
    }

    fn estimate_tokens(&self) -> u32 {
        (self.0.len() / 3).max(1) as u32
    }
}

/// Diff two lines word by word.
///
/// The first vector describes the old line (Unchanged/Deleted), the second the
/// new line (Unchanged/Added). Concatenating either side's text reproduces its input.
pub fn word_diff(old: &str, new: &str) -> (Vec<WordSegment>, Vec<WordSegment>) {
    let old_tokens: Vec<&str> = old.split_word_bounds().collect();
    let new_tokens: Vec<&str> = new.split_word_bounds().collect();

    let input = InternedInput::new(Words(old), Words(new));
    let diff = Diff::compute(Algorithm::Histogram, &input);

    let mut old_changed = vec![false; old_tokens.len()];
    let mut new_changed = vec![false; new_tokens.len()];
    for hunk in diff.hunks() {
        for idx in hunk.before {
            if let Some(flag) = old_changed.get_mut(idx as usize) {
                *flag = true;
            }
        }
        for idx in hunk.after {
            if let Some(flag) = new_changed.get_mut(idx as usize) {
                *flag = true;
            }
        }
    }

    (
        merge_segments(&old_tokens, &old_changed, SegmentKind::Deleted),
        merge_segments(&new_tokens, &new_changed, SegmentKind::Added),
    )
}

fn merge_segments(tokens: &[&str], changed: &[bool], changed_kind: SegmentKind) -> Vec<WordSegment> {
    let mut segments: Vec<WordSegment> = Vec::new();
    for (token, &is_changed) in tokens.iter().zip(changed) {
        let kind = if is_changed {
            changed_kind
        } else {
            SegmentKind::Unchanged
        };
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(token),
            _ => segments.push(WordSegment {
                kind,
                text: (*token).to_string(),
            }),
        }
    }
    segments
}

/// Word segments for every paired line of one file, keyed by (hunk, line)
#[derive(Debug, Clone, Default)]
pub struct FileWordDiff {
    lines: FxHashMap<(usize, usize), (LineKind, Vec<WordSegment>)>,
}

impl FileWordDiff {
    pub fn compute(file: &DiffFile) -> Self {
        let mut lines = FxHashMap::default();
        for (hunk_idx, hunk) in file.hunks.iter().enumerate() {
            for (deleted, added) in modification_pairs(hunk) {
                let old = &hunk.lines[deleted].content;
                let new = &hunk.lines[added].content;
                if old.len() > MAX_WORD_DIFF_LINE || new.len() > MAX_WORD_DIFF_LINE {
                    continue;
                }
                let (old_segments, new_segments) = word_diff(old, new);
                lines.insert((hunk_idx, deleted), (LineKind::Deletion, old_segments));
                lines.insert((hunk_idx, added), (LineKind::Addition, new_segments));
            }
        }
        Self { lines }
    }

    pub fn get(&self, hunk_idx: usize, line_idx: usize, kind: LineKind) -> Option<&[WordSegment]> {
        self.lines
            .get(&(hunk_idx, line_idx))
            .filter(|(stored, _)| *stored == kind)
            .map(|(_, segments)| segments.as_slice())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Positional (deletion, addition) index pairs inside each modification block
pub fn modification_pairs(hunk: &Hunk) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let lines = &hunk.lines;
    let mut idx = 1;
    while idx < lines.len() {
        if lines[idx].kind != LineKind::Deletion {
            idx += 1;
            continue;
        }
        let del_start = idx;
        while idx < lines.len() && lines[idx].kind == LineKind::Deletion {
            idx += 1;
        }
        let add_start = idx;
        while idx < lines.len() && lines[idx].kind == LineKind::Addition {
            idx += 1;
        }
        let paired = (add_start - del_start).min(idx - add_start);
        pairs.extend((0..paired).map(|offset| (del_start + offset, add_start + offset)));
    }
    pairs
}

/// Per-file word diffs computed on first use
#[derive(Debug, Default)]
pub struct WordDiffCache {
    files: FxHashMap<String, FileWordDiff>,
}

impl WordDiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments for one line; `None` means render without highlighting
    pub fn segments(
        &mut self,
        file: &DiffFile,
        hunk_idx: usize,
        line_idx: usize,
        kind: LineKind,
    ) -> Option<&[WordSegment]> {
        if !matches!(kind, LineKind::Addition | LineKind::Deletion) {
            return None;
        }
        self.files
            .entry(file.key().to_string())
            .or_insert_with(|| {
                tracing::debug!(file = file.key(), "computing word diff");
                FileWordDiff::compute(file)
            })
            .get(hunk_idx, line_idx, kind)
    }

    /// Drop everything; call whenever the displayed file set is replaced
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
