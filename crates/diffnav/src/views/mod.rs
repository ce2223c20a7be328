//! View rendering modules

pub mod commit_pane;
pub mod content;
pub mod file_list;
pub mod header;
pub mod layout;
pub mod scrollbar;
pub mod status;
pub mod style;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use content::{CommitHeader, DiffDocument, VirtualContent};
pub use header::HeaderInfo;
pub use scrollbar::scrollbar;
pub use viewport::{DiffViewport, ScrollPosition, VIRTUAL_THRESHOLD};
