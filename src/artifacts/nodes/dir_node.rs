use crate::artifacts::nodes::file_node::FileNode;
use crate::artifacts::nodes::{Node, by_name};
use std::sync::Arc;

/// Directory node owning leaves and sub-directories
///
/// Children keep their insertion order until [`DirNode::sort`] is called. Trees are
/// built by a single owner and shared read-only through `Arc` afterwards; the
/// mutating methods reach into shared children with `Arc::make_mut`.
#[derive(Debug, Clone, Default)]
pub struct DirNode {
    name: String,
    root: Option<String>,
    leaves: Vec<Arc<FileNode>>,
    dirs: Vec<Arc<DirNode>>,
}

/// One element of a resolved path
#[derive(Debug, Clone)]
pub enum NodeRef {
    Dir(Arc<DirNode>),
    Leaf(Arc<FileNode>),
}

impl NodeRef {
    pub fn name(&self) -> &str {
        match self {
            NodeRef::Dir(dir) => dir.name(),
            NodeRef::Leaf(leaf) => leaf.name(),
        }
    }
}

/// Outcome of [`DirNode::resolve_path`]: the nodes found from the root downward and
/// whether every requested name was found
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    nodes: Vec<NodeRef>,
    resolved: bool,
}

impl ResolvedPath {
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn last(&self) -> Option<&NodeRef> {
        self.nodes.last()
    }

    /// Directory-shaped end of the path; a trailing leaf gets wrapped in a singleton
    pub fn into_dir(self) -> Option<Arc<DirNode>> {
        if !self.resolved {
            return None;
        }

        match self.nodes.into_iter().last()? {
            NodeRef::Dir(dir) => Some(dir),
            NodeRef::Leaf(leaf) => Some(Arc::new(DirNode::singleton_leaf(leaf))),
        }
    }
}

impl DirNode {
    pub fn new(name: impl Into<String>, leaves: Vec<FileNode>, dirs: Vec<DirNode>) -> Self {
        DirNode {
            name: name.into(),
            root: None,
            leaves: leaves.into_iter().map(Arc::new).collect(),
            dirs: dirs.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    /// Nameless directory holding exactly one leaf
    pub fn singleton_leaf(leaf: Arc<FileNode>) -> Self {
        DirNode {
            leaves: vec![leaf],
            ..Default::default()
        }
    }

    /// Nameless directory holding exactly one sub-directory
    pub fn singleton_dir(dir: Arc<DirNode>) -> Self {
        DirNode {
            dirs: vec![dir],
            ..Default::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.set_root(root);
        self
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = Some(root.into());
    }

    pub fn leaves(&self) -> &[Arc<FileNode>] {
        &self.leaves
    }

    pub fn dirs(&self) -> &[Arc<DirNode>] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.dirs.is_empty()
    }

    /// Number of entries below this directory, itself excluded
    pub fn entry_count(&self) -> usize {
        self.leaves.len()
            + self.dirs.len()
            + self.dirs.iter().map(|dir| dir.entry_count()).sum::<usize>()
    }

    pub fn add_leaf(&mut self, leaf: impl Into<Arc<FileNode>>) {
        self.leaves.push(leaf.into());
    }

    pub fn add_dir(&mut self, dir: impl Into<Arc<DirNode>>) {
        self.dirs.push(dir.into());
    }

    pub fn remove_leaf(&mut self, name: &str) -> Option<Arc<FileNode>> {
        let index = self.leaves.iter().position(|leaf| leaf.name() == name)?;
        Some(self.leaves.remove(index))
    }

    /// Sub-directory with the given name, created empty when missing
    pub fn ensure_dir(&mut self, name: &str) -> &mut DirNode {
        let index = match self.dirs.iter().position(|dir| dir.name() == name) {
            Some(index) => index,
            None => {
                self.dirs.push(Arc::new(DirNode::named(name)));
                self.dirs.len() - 1
            }
        };

        Arc::make_mut(&mut self.dirs[index])
    }

    /// Sort leaves and sub-directories by exact name, recursively
    pub fn sort(&mut self) {
        self.leaves.sort_by(|a, b| by_name(a.as_ref(), b.as_ref()));
        self.dirs.sort_by(|a, b| by_name(a.as_ref(), b.as_ref()));

        for dir in self.dirs.iter_mut() {
            Arc::make_mut(dir).sort();
        }
    }

    /// Drop every leaf and sub-directory whose name is rejected by `keep`, recursively
    pub fn retain(&mut self, keep: &dyn Fn(&str) -> bool) {
        self.leaves.retain(|leaf| keep(leaf.name()));
        self.dirs.retain(|dir| keep(dir.name()));

        for dir in self.dirs.iter_mut() {
            Arc::make_mut(dir).retain(keep);
        }
    }

    pub fn leaf(&self, name: &str) -> Option<&Arc<FileNode>> {
        self.leaves.iter().find(|leaf| leaf.name() == name)
    }

    pub fn dir(&self, name: &str) -> Option<&Arc<DirNode>> {
        self.dirs.iter().find(|dir| dir.name() == name)
    }

    /// Walk `names` downward from this directory
    ///
    /// The returned nodes start with `self`. Resolution stops at the first missing
    /// name. A leaf is only accepted as the last element; wrapping it into a
    /// directory is left to the caller (see [`ResolvedPath::into_dir`]).
    pub fn resolve_path<S: AsRef<str>>(self: &Arc<Self>, names: &[S]) -> ResolvedPath {
        let mut nodes = vec![NodeRef::Dir(Arc::clone(self))];
        let mut current = Arc::clone(self);

        for (position, name) in names.iter().map(AsRef::as_ref).enumerate() {
            let is_last = position + 1 == names.len();

            if let Some(dir) = current.dir(name).cloned() {
                nodes.push(NodeRef::Dir(Arc::clone(&dir)));
                current = dir;
            } else if let Some(leaf) = current.leaf(name)
                && is_last
            {
                nodes.push(NodeRef::Leaf(Arc::clone(leaf)));
            } else {
                return ResolvedPath {
                    nodes,
                    resolved: false,
                };
            }
        }

        ResolvedPath {
            nodes,
            resolved: true,
        }
    }
}

impl Node for DirNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }
}
