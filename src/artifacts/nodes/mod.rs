//! Tree node model
//!
//! Trees are made of [`DirNode`]s owning [`FileNode`] leaves and sub-directories.
//! Comparisons produce a parallel result tree of [`ComparisonDirNode`]s and
//! [`LeafComparisonResult`]s.
//!
//! Every node has a name fixed at construction and an optional `root` marker that
//! is only set on the top node of a tree and is used to rebuild display paths.
//! Ordering is by exact name; the case-insensitive order is only used for matching.

pub mod comparison;
pub mod dir_node;
pub mod file_node;

pub use comparison::{
    ComparisonDirNode, ComparisonEntry, ComparisonStatus, ComparisonSummary, EntryKind,
    EntryStatus, LeafComparisonResult,
};
pub use dir_node::{DirNode, NodeRef, ResolvedPath};
pub use file_node::{ContentMethod, ContentSource, Cost, FileNode, FileType};

use std::cmp::Ordering;

pub trait Node {
    fn name(&self) -> &str;

    fn root(&self) -> Option<&str> {
        None
    }
}

/// Exact, case-sensitive name order
pub fn by_name<N: Node + ?Sized>(a: &N, b: &N) -> Ordering {
    a.name().cmp(b.name())
}

/// Case-insensitive name order, falling back to the exact order for names that only
/// differ in case so the result stays total
pub fn by_name_ignore_case<N: Node + ?Sized>(a: &N, b: &N) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| by_name(a, b))
}

/// Human readable path made of a tree's root marker followed by entry names
pub fn display_path<S: AsRef<str>>(root: Option<&str>, names: &[S]) -> String {
    let root = root.unwrap_or_default();
    let mut path = match root.trim_end_matches('/') {
        "" => root.to_string(),
        trimmed => trimmed.to_string(),
    };

    for name in names.iter().map(AsRef::as_ref).filter(|name| !name.is_empty()) {
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(name);
    }

    path
}
