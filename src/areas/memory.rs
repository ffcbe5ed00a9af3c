//! In-memory trees
//!
//! [`MemorySource`] serves content from a byte buffer with a configurable cost
//! table, which lets it stand in for the sources this crate does not read itself:
//! [`MemorySource::archived`] behaves like a zip entry (CRC known up front, content
//! behind a decompressor) and [`MemorySource::snapshot`] like a stored listing that
//! only remembers digests.

use crate::areas::builder::TreeBuilder;
use crate::artifacts::content::checksum::crc32;
use crate::artifacts::content::digest::ContentDigest;
use crate::artifacts::errors::ErrorHandler;
use crate::artifacts::nodes::{
    ContentMethod, ContentSource, Cost, DirNode, FileNode, FileType, Node,
};
use bytes::Bytes;
use std::io::Read;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemorySource {
    content: Bytes,
    costs: [Cost; 4],
    stored_checksum: Option<u32>,
    stored_digest: Option<ContentDigest>,
}

impl MemorySource {
    /// Content every method can use cheaply
    pub fn new(content: impl Into<Bytes>) -> Self {
        MemorySource {
            content: content.into(),
            costs: [Cost::Easy; 4],
            stored_checksum: None,
            stored_digest: None,
        }
    }

    /// Archive entry: the checksum is free, reading the content is not
    pub fn archived(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let stored_checksum = crc32(&content[..]).ok();

        MemorySource {
            content,
            costs: [Cost::Easy, Cost::Impossible, Cost::Hard, Cost::Hard],
            stored_checksum,
            stored_digest: None,
        }
    }

    /// Snapshot record: only the digest is known
    pub fn snapshot(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let stored_digest = Some(ContentDigest::from_bytes(&content));

        MemorySource {
            content,
            costs: [Cost::Impossible, Cost::Easy, Cost::Impossible, Cost::Impossible],
            stored_checksum: None,
            stored_digest,
        }
    }

    pub fn with_cost(mut self, method: ContentMethod, cost: Cost) -> Self {
        self.costs[method.index()] = cost;
        self
    }

    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.stored_checksum = Some(checksum);
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl ContentSource for MemorySource {
    fn cost(&self, method: ContentMethod) -> Cost {
        self.costs[method.index()]
    }

    fn open(&self) -> anyhow::Result<Box<dyn Read + '_>> {
        Ok(Box::new(&self.content[..]))
    }

    fn stored_checksum(&self) -> Option<u32> {
        self.stored_checksum
    }

    fn stored_digest(&self) -> Option<ContentDigest> {
        self.stored_digest.clone()
    }
}

/// Tree assembled from slash separated paths
///
/// Intermediate directories are created on demand and adding a file twice replaces
/// the first one. The built tree's top node is nameless and carries the label as
/// its root marker.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    label: String,
    root: DirNode,
}

impl MemoryTree {
    pub fn new(label: impl Into<String>) -> Self {
        MemoryTree {
            label: label.into(),
            root: DirNode::default(),
        }
    }

    pub fn file(self, path: &str, content: impl Into<Bytes>) -> Self {
        let source = MemorySource::new(content);
        let size = source.len() as u64;

        self.source(path, source, size)
    }

    pub fn source(self, path: &str, source: impl ContentSource + 'static, size: u64) -> Self {
        let name = leaf_name(path);
        self.node(path, FileNode::new(name, FileType::Regular, size, Arc::new(source)))
    }

    pub fn symlink(self, path: &str, target: &str) -> Self {
        let name = leaf_name(path);
        let source = MemorySource::new(target.to_string());
        let size = source.len() as u64;

        self.node(path, FileNode::new(name, FileType::Symlink, size, Arc::new(source)))
    }

    /// Place `leaf` in the directory named by all but the last segment of `path`
    pub fn node(mut self, path: &str, leaf: FileNode) -> Self {
        let segments = segments(path);
        let parents = segments.len().saturating_sub(1);
        let parent = self.ensure_dirs(&segments[..parents]);

        parent.remove_leaf(leaf.name());
        parent.add_leaf(leaf);
        self
    }

    /// Make sure every directory along `path` exists
    pub fn dir(mut self, path: &str) -> Self {
        self.ensure_dirs(&segments(path));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn to_tree(&self) -> DirNode {
        self.root.clone().with_root(self.label.clone())
    }

    fn ensure_dirs(&mut self, names: &[&str]) -> &mut DirNode {
        let mut dir = &mut self.root;
        for name in names {
            dir = dir.ensure_dir(name);
        }
        dir
    }
}

impl TreeBuilder for MemoryTree {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn build(&self, _handler: &mut dyn ErrorHandler) -> anyhow::Result<DirNode> {
        Ok(self.to_tree())
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn leaf_name(path: &str) -> String {
    segments(path).last().copied().unwrap_or_default().to_string()
}
