//! Side-by-side pairing of hunk lines

use crate::parser::{Hunk, LineKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    Header,
    Context,
    Modification,
    DeletionOnly,
    AdditionOnly,
}

/// One side-by-side row; sides index into `Hunk::lines`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePair {
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub kind: PairKind,
}

impl LinePair {
    fn new(left: Option<usize>, right: Option<usize>, kind: PairKind) -> Self {
        Self { left, right, kind }
    }
}

/// Align a hunk into side-by-side rows.
///
/// A run of d deletions followed by a added lines becomes max(d, a) rows:
/// the first min(d, a) are modifications, the rest deletion-only or
/// addition-only.
pub fn align_hunk(hunk: &Hunk) -> Vec<LinePair> {
    let lines = &hunk.lines;
    let mut pairs = Vec::with_capacity(lines.len());
    pairs.push(LinePair::new(Some(0), None, PairKind::Header));

    let mut idx = 1;
    while idx < lines.len() {
        match lines[idx].kind {
            LineKind::Deletion => {
                let del_start = idx;
                while idx < lines.len() && lines[idx].kind == LineKind::Deletion {
                    idx += 1;
                }
                let add_start = idx;
                while idx < lines.len() && lines[idx].kind == LineKind::Addition {
                    idx += 1;
                }
                let deletions = add_start - del_start;
                let additions = idx - add_start;
                for offset in 0..deletions.max(additions) {
                    let left = (offset < deletions).then_some(del_start + offset);
                    let right = (offset < additions).then_some(add_start + offset);
                    // Pairing is positional only; equal text still pairs as a modification
                    let kind = match (left, right) {
                        (Some(_), Some(_)) => PairKind::Modification,
                        (Some(_), None) => PairKind::DeletionOnly,
                        _ => PairKind::AdditionOnly,
                    };
                    pairs.push(LinePair::new(left, right, kind));
                }
            }
            LineKind::Addition => {
                pairs.push(LinePair::new(None, Some(idx), PairKind::AdditionOnly));
                idx += 1;
            }
            LineKind::Context => {
                pairs.push(LinePair::new(Some(idx), Some(idx), PairKind::Context));
                idx += 1;
            }
            LineKind::HunkHeader => idx += 1,
        }
    }
    pairs
}
