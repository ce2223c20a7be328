//! Unified diff parsing

use crate::error::DiffError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Path used by git for the missing side of a created or deleted file
pub const DEV_NULL: &str = "/dev/null";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -([^\s,]+)(?:,([^\s,]+))? \+([^\s,]+)(?:,([^\s,]+))? @@(.*)$")
        .expect("hunk header pattern should compile")
});

/// Kind of a single diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Context,
    Addition,
    Deletion,
    /// Synthetic row standing in for the `@@` header
    HunkHeader,
}

/// A line inside a hunk (content has no prefix character)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    /// 0 when the line has no old-side number
    pub old_line_num: usize,
    /// 0 when the line has no new-side number
    pub new_line_num: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Raw header text including trailing context (e.g. a function signature)
    pub header: String,
    /// `lines[0]` is always the header line
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    fn new(old_start: usize, old_count: usize, new_start: usize, new_count: usize, header: &str) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            header: header.to_string(),
            lines: vec![DiffLine {
                kind: LineKind::HunkHeader,
                old_line_num: 0,
                new_line_num: 0,
                content: header.to_string(),
            }],
        }
    }

    /// Content lines (everything but the header row)
    pub fn body(&self) -> &[DiffLine] {
        &self.lines[1..]
    }
}

/// Status of a file, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Untracked,
}

impl FileStatus {
    pub fn marker(self) -> char {
        match self {
            FileStatus::Modified => 'M',
            FileStatus::Added => 'A',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Untracked => '?',
        }
    }
}

/// One file section of a unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub old_path: String,
    pub new_path: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub is_renamed: bool,
    pub is_binary: bool,
    pub is_untracked: bool,
    /// Rename detection confidence (0-100)
    pub similarity: u8,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

impl DiffFile {
    /// Path shown to the user: the new path, or the old one for deletions
    pub fn display_path(&self) -> &str {
        if self.is_deleted || self.new_path.is_empty() || self.new_path == DEV_NULL {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Identity used for per-file caches
    pub fn key(&self) -> &str {
        if self.new_path.is_empty() || self.new_path == DEV_NULL {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    pub fn status(&self) -> FileStatus {
        if self.is_untracked {
            FileStatus::Untracked
        } else if self.is_new {
            FileStatus::Added
        } else if self.is_deleted {
            FileStatus::Deleted
        } else if self.is_renamed {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        }
    }
}

struct ParseState {
    files: Vec<DiffFile>,
    file: Option<DiffFile>,
    hunk: Option<Hunk>,
    old_line: usize,
    new_line: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl ParseState {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            file: None,
            hunk: None,
            old_line: 0,
            new_line: 0,
            old_remaining: 0,
            new_remaining: 0,
        }
    }

    fn flush_hunk(&mut self) {
        if let Some(hunk) = self.hunk.take() {
            if let Some(file) = self.file.as_mut() {
                file.hunks.push(hunk);
            }
        }
        self.old_remaining = 0;
        self.new_remaining = 0;
    }

    fn flush_file(&mut self) {
        self.flush_hunk();
        if let Some(file) = self.file.take() {
            self.files.push(file);
        }
    }

    /// True while the open hunk still expects lines from its declared ranges
    fn in_hunk_body(&self) -> bool {
        self.hunk.is_some() && (self.old_remaining > 0 || self.new_remaining > 0)
    }

    fn push_line(&mut self, kind: LineKind, content: &str) {
        let Some(hunk) = self.hunk.as_mut() else {
            return;
        };
        let (old_line_num, new_line_num) = match kind {
            LineKind::Context => {
                let nums = (self.old_line, self.new_line);
                self.old_line += 1;
                self.new_line += 1;
                self.old_remaining = self.old_remaining.saturating_sub(1);
                self.new_remaining = self.new_remaining.saturating_sub(1);
                nums
            }
            LineKind::Deletion => {
                let nums = (self.old_line, 0);
                self.old_line += 1;
                self.old_remaining = self.old_remaining.saturating_sub(1);
                if let Some(file) = self.file.as_mut() {
                    file.deletions += 1;
                }
                nums
            }
            LineKind::Addition => {
                let nums = (0, self.new_line);
                self.new_line += 1;
                self.new_remaining = self.new_remaining.saturating_sub(1);
                if let Some(file) = self.file.as_mut() {
                    file.additions += 1;
                }
                nums
            }
            LineKind::HunkHeader => (0, 0),
        };
        hunk.lines.push(DiffLine {
            kind,
            old_line_num,
            new_line_num,
            content: content.to_string(),
        });
    }
}

/// Parse unified diff text into files.
///
/// Unknown lines are skipped; only non-numeric hunk header fields fail the parse.
pub fn parse_diff(text: &str) -> Result<Vec<DiffFile>, DiffError> {
    let mut state = ParseState::new();

    for (idx, line) in text.lines().enumerate() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            state.flush_file();
            let (old_path, new_path) = split_git_paths(rest);
            state.file = Some(DiffFile {
                old_path,
                new_path,
                ..DiffFile::default()
            });
            continue;
        }

        let content_wins = state.in_hunk_body();

        if !content_wins {
            if let Some(file) = state.file.as_mut() {
                if parse_header_line(file, line) {
                    continue;
                }
            }
        }

        if line.starts_with("@@") {
            if let Some(caps) = HUNK_HEADER.captures(line) {
                let field = |i: usize| caps.get(i).map(|m| m.as_str());
                let old_start = parse_number(field(1), idx, line)?;
                let old_count = match field(2) {
                    Some(_) => parse_number(field(2), idx, line)?,
                    None => 1,
                };
                let new_start = parse_number(field(3), idx, line)?;
                let new_count = match field(4) {
                    Some(_) => parse_number(field(4), idx, line)?,
                    None => 1,
                };
                state.flush_hunk();
                if state.file.is_none() {
                    continue;
                }
                state.hunk = Some(Hunk::new(old_start, old_count, new_start, new_count, line));
                state.old_line = old_start;
                state.new_line = new_start;
                state.old_remaining = old_count;
                state.new_remaining = new_count;
                continue;
            }
        }

        if state.hunk.is_none() {
            continue;
        }

        match line.as_bytes().first() {
            Some(b' ') => state.push_line(LineKind::Context, &line[1..]),
            Some(b'-') => state.push_line(LineKind::Deletion, &line[1..]),
            Some(b'+') => state.push_line(LineKind::Addition, &line[1..]),
            Some(b'\\') => {}
            None if content_wins => state.push_line(LineKind::Context, ""),
            _ => {}
        }
    }

    state.flush_file();
    Ok(state.files)
}

/// Apply a file-level header line; returns false when the line is not one
fn parse_header_line(file: &mut DiffFile, line: &str) -> bool {
    if let Some(rest) = line.strip_prefix("--- ") {
        let path = strip_timestamp(rest);
        if path == DEV_NULL {
            file.old_path = DEV_NULL.to_string();
            file.is_new = true;
        } else {
            file.old_path = strip_side_prefix(path, "a/");
        }
        return true;
    }
    if let Some(rest) = line.strip_prefix("+++ ") {
        let path = strip_timestamp(rest);
        if path == DEV_NULL {
            file.new_path = DEV_NULL.to_string();
            file.is_deleted = true;
        } else {
            file.new_path = strip_side_prefix(path, "b/");
        }
        return true;
    }
    if let Some(rest) = line.strip_prefix("similarity index ") {
        file.is_renamed = true;
        file.similarity = rest
            .trim_end_matches('%')
            .trim()
            .parse::<u8>()
            .map(|v| v.min(100))
            .unwrap_or(0);
        return true;
    }
    if let Some(rest) = line.strip_prefix("rename from ") {
        file.is_renamed = true;
        file.old_path = unquote(rest);
        return true;
    }
    if let Some(rest) = line.strip_prefix("rename to ") {
        file.is_renamed = true;
        file.new_path = unquote(rest);
        return true;
    }
    if line.starts_with("Binary files ") && line.ends_with(" differ") {
        file.is_binary = true;
        return true;
    }
    if line.starts_with("new file mode ") {
        file.is_new = true;
        return true;
    }
    if line.starts_with("deleted file mode ") {
        file.is_deleted = true;
        return true;
    }
    line.starts_with("old mode ") || line.starts_with("new mode ") || line.starts_with("index ")
}

fn parse_number(field: Option<&str>, idx: usize, line: &str) -> Result<usize, DiffError> {
    let raw = field.unwrap_or_default();
    raw.parse::<usize>().map_err(|_| {
        DiffError::parse(format!(
            "invalid number {:?} in hunk header at line {}: {}",
            raw,
            idx + 1,
            line
        ))
    })
}

/// Split `a/<old> b/<new>` from a `diff --git` line, tolerating spaces in paths
fn split_git_paths(rest: &str) -> (String, String) {
    let rest = rest.trim();
    if let Some(stripped) = rest.strip_prefix("\"a/") {
        if let Some(pos) = stripped.find("\" ") {
            let old = stripped[..pos].to_string();
            let new = unquote(&stripped[pos + 2..]);
            return (old, strip_side_prefix(&new, "b/"));
        }
    }
    if let Some(after_a) = rest.strip_prefix("a/") {
        // Identical paths: "PATH b/PATH", so PATH is (len - 3) / 2 bytes long
        let half = after_a.len().saturating_sub(3) / 2;
        if half > 0
            && after_a.get(..half).is_some()
            && after_a.get(half..half + 3) == Some(" b/")
            && after_a.get(..half) == after_a.get(half + 3..)
        {
            let path = after_a[..half].to_string();
            return (path.clone(), path);
        }
        if let Some(pos) = after_a.find(" b/") {
            return (after_a[..pos].to_string(), after_a[pos + 3..].to_string());
        }
    }
    (rest.to_string(), rest.to_string())
}

fn strip_timestamp(path: &str) -> &str {
    path.split('\t').next().unwrap_or(path).trim_end()
}

fn strip_side_prefix(path: &str, prefix: &str) -> String {
    let path = unquote(path);
    match path.strip_prefix(prefix) {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

fn unquote(path: &str) -> String {
    let path = path.trim();
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        path[1..path.len() - 1].to_string()
    } else {
        path.to_string()
    }
}

/// Build an all-additions diff for a file git does not track yet
pub fn untracked_file_diff(path: &str, content: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "diff --git a/{path} b/{path}");
    out.push_str("new file mode 100644\n");
    if content.contains('\0') {
        let _ = writeln!(out, "Binary files {DEV_NULL} and b/{path} differ");
        return out;
    }
    let _ = writeln!(out, "--- {DEV_NULL}");
    let _ = writeln!(out, "+++ b/{path}");
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return out;
    }
    let _ = writeln!(out, "@@ -0,0 +1,{} @@", lines.len());
    for line in lines {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Parse a synthesized untracked-file diff and flag it as untracked
pub fn parse_untracked(path: &str, content: &str) -> Result<DiffFile, DiffError> {
    let text = untracked_file_diff(path, content);
    let mut file = parse_diff(&text)?
        .into_iter()
        .next()
        .unwrap_or_else(|| DiffFile {
            new_path: path.to_string(),
            is_new: true,
            ..DiffFile::default()
        });
    file.is_untracked = true;
    Ok(file)
}
