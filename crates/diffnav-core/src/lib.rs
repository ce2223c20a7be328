//! diffnav-core - Diff engine for the diffnav terminal viewer
//!
//! Parses unified diff text into files and hunks, arranges files into a
//! browsable tree, computes intra-line word diffs and pairs lines for
//! side-by-side display. Version-control access sits behind the
//! [`Collaborator`] trait.

pub mod align;
pub mod error;
pub mod git;
pub mod parser;
pub mod tree;
pub mod word;

pub use align::{align_hunk, LinePair, PairKind};
pub use error::{DiffError, ErrorKind, RecoveryAction};
pub use git::{
    is_git_repo, BranchEntry, Collaborator, CommitEntry, GitCli, GitError, WorktreeEntry,
};
pub use parser::{
    parse_diff, parse_untracked, untracked_file_diff, DiffFile, DiffLine, FileStatus, Hunk,
    LineKind, DEV_NULL,
};
pub use tree::{FileTree, NodeId, TreeNode};
pub use word::{word_diff, FileWordDiff, SegmentKind, WordDiffCache, WordSegment};
