//! Hierarchical file tree over a parsed diff

use crate::parser::DiffFile;
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub type NodeId = usize;

/// A directory or file node in the tree arena
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    /// Full path from the tree root
    pub path: String,
    pub depth: usize,
    pub is_dir: bool,
    pub expanded: bool,
    pub children: Vec<NodeId>,
    /// Index into the source file list (leaves only)
    pub file: Option<usize>,
}

/// Directory tree over a diff's files with a memoized visible-row list
#[derive(Debug, Clone)]
pub struct FileTree {
    files: Arc<[DiffFile]>,
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    visible: Vec<NodeId>,
    dirty: bool,
}

impl FileTree {
    pub fn new(files: Arc<[DiffFile]>) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut roots: Vec<NodeId> = Vec::new();
        let mut dirs: FxHashMap<String, NodeId> = FxHashMap::default();

        for (file_idx, file) in files.iter().enumerate() {
            let path = file.display_path();
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            let Some((leaf, dir_parts)) = parts.split_last() else {
                continue;
            };

            let mut parent: Option<NodeId> = None;
            let mut prefix = String::new();
            for (depth, part) in dir_parts.iter().enumerate() {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(part);
                let id = match dirs.get(&prefix) {
                    Some(&id) => id,
                    None => {
                        let id = nodes.len();
                        nodes.push(TreeNode {
                            name: (*part).to_string(),
                            path: prefix.clone(),
                            depth,
                            is_dir: true,
                            expanded: true,
                            children: Vec::new(),
                            file: None,
                        });
                        attach(&mut nodes, &mut roots, parent, id);
                        dirs.insert(prefix.clone(), id);
                        id
                    }
                };
                parent = Some(id);
            }

            let id = nodes.len();
            nodes.push(TreeNode {
                name: (*leaf).to_string(),
                path: path.to_string(),
                depth: dir_parts.len(),
                is_dir: false,
                expanded: true,
                children: Vec::new(),
                file: Some(file_idx),
            });
            attach(&mut nodes, &mut roots, parent, id);
        }

        sort_level(&nodes, &mut roots);
        for idx in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[idx].children);
            sort_level(&nodes, &mut children);
            nodes[idx].children = children;
        }

        Self {
            files,
            nodes,
            roots,
            visible: Vec::new(),
            dirty: true,
        }
    }

    pub fn files(&self) -> &Arc<[DiffFile]> {
        &self.files
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Flattened rows honoring expand state, rebuilt only after a toggle
    pub fn visible_nodes(&mut self) -> &[NodeId] {
        if self.dirty {
            let mut visible = Vec::with_capacity(self.nodes.len());
            for &root in &self.roots {
                self.push_visible(root, &mut visible);
            }
            self.visible = visible;
            self.dirty = false;
        }
        &self.visible
    }

    fn push_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let node = &self.nodes[id];
        if node.is_dir && node.expanded {
            for &child in &node.children {
                self.push_visible(child, out);
            }
        }
    }

    /// Flip a directory's expansion. Files are left alone and return false.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.is_dir => {
                node.expanded = !node.expanded;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Summed additions and deletions below a node
    pub fn total_stats(&self, id: NodeId) -> (usize, usize) {
        let Some(node) = self.nodes.get(id) else {
            return (0, 0);
        };
        if let Some(file) = node.file.and_then(|idx| self.files.get(idx)) {
            return (file.additions, file.deletions);
        }
        node.children.iter().fold((0, 0), |(add, del), &child| {
            let (a, d) = self.total_stats(child);
            (add + a, del + d)
        })
    }

    pub fn file_count(&self, id: NodeId) -> usize {
        match self.nodes.get(id) {
            Some(node) if node.is_dir => node
                .children
                .iter()
                .map(|&child| self.file_count(child))
                .sum(),
            Some(_) => 1,
            None => 0,
        }
    }

    /// File indices below a node in tree order, ignoring collapse state
    pub fn collect_files(&self, id: NodeId) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_into(id, &mut out);
        out
    }

    fn collect_into(&self, id: NodeId, out: &mut Vec<usize>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let Some(file) = node.file {
            out.push(file);
        }
        for &child in &node.children {
            self.collect_into(child, out);
        }
    }

    /// Clamp a selection index into the visible rows
    pub fn clamp_index(&mut self, idx: usize) -> usize {
        let len = self.visible_nodes().len();
        idx.min(len.saturating_sub(1))
    }
}

fn attach(nodes: &mut [TreeNode], roots: &mut Vec<NodeId>, parent: Option<NodeId>, id: NodeId) {
    match parent {
        Some(parent) => nodes[parent].children.push(id),
        None => roots.push(id),
    }
}

fn sort_level(nodes: &[TreeNode], ids: &mut [NodeId]) {
    ids.sort_by_cached_key(|&id| {
        let node = &nodes[id];
        (!node.is_dir, node.name.to_lowercase())
    });
}
