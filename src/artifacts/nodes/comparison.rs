//! Comparison result nodes
//!
//! A result tree mirrors the union of the two compared trees. Every node records
//! whether it was found on the old side, on the new side, and, when present on both,
//! whether both copies are identical. A directory is identical only when all of its
//! children are.

use crate::artifacts::nodes::file_node::FileNode;
use crate::artifacts::nodes::{Node, display_path};
use colored::Colorize;
use std::sync::Arc;

/// Presence and equality of one entry
///
/// Only constructible through methods keeping `same` implied by presence on both
/// sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparisonStatus {
    missing1: bool,
    missing2: bool,
    same: bool,
}

impl ComparisonStatus {
    pub fn only_old() -> Self {
        ComparisonStatus {
            missing1: false,
            missing2: true,
            same: false,
        }
    }

    pub fn only_new() -> Self {
        ComparisonStatus {
            missing1: true,
            missing2: false,
            same: false,
        }
    }

    pub fn both(same: bool) -> Self {
        ComparisonStatus {
            missing1: false,
            missing2: false,
            same,
        }
    }

    /// Missing from the old side
    pub fn missing1(&self) -> bool {
        self.missing1
    }

    /// Missing from the new side
    pub fn missing2(&self) -> bool {
        self.missing2
    }

    pub fn is_same(&self) -> bool {
        self.same
    }

    pub fn entry_status(&self) -> EntryStatus {
        match (self.missing1, self.missing2, self.same) {
            (false, true, _) => EntryStatus::OnlyOld,
            (true, false, _) => EntryStatus::OnlyNew,
            (_, _, true) => EntryStatus::Same,
            _ => EntryStatus::Different,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryStatus {
    Same,
    Different,
    OnlyOld,
    OnlyNew,
}

impl From<&EntryStatus> for &str {
    fn from(status: &EntryStatus) -> Self {
        match status {
            EntryStatus::Same => " ",
            EntryStatus::Different => "M",
            EntryStatus::OnlyOld => "-",
            EntryStatus::OnlyNew => "+",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label: &str = self.into();
        let colored_label = match self {
            EntryStatus::Same => label.normal(),
            EntryStatus::Different => label.yellow(),
            EntryStatus::OnlyOld => label.red(),
            EntryStatus::OnlyNew => label.green(),
        };
        write!(f, "{}", colored_label)
    }
}

/// Result of comparing (or failing to find) one leaf on each side
#[derive(Debug, Clone)]
pub struct LeafComparisonResult {
    name: String,
    name1: Option<String>,
    name2: Option<String>,
    status: ComparisonStatus,
    old: Option<Arc<FileNode>>,
    new: Option<Arc<FileNode>>,
}

impl LeafComparisonResult {
    pub fn paired(old: Arc<FileNode>, new: Arc<FileNode>, same: bool) -> Self {
        LeafComparisonResult {
            name: old.name().to_string(),
            name1: Some(old.name().to_string()),
            name2: Some(new.name().to_string()),
            status: ComparisonStatus::both(same),
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn only_old(old: Arc<FileNode>) -> Self {
        LeafComparisonResult {
            name: old.name().to_string(),
            name1: Some(old.name().to_string()),
            name2: None,
            status: ComparisonStatus::only_old(),
            old: Some(old),
            new: None,
        }
    }

    pub fn only_new(new: Arc<FileNode>) -> Self {
        LeafComparisonResult {
            name: new.name().to_string(),
            name1: None,
            name2: Some(new.name().to_string()),
            status: ComparisonStatus::only_new(),
            old: None,
            new: Some(new),
        }
    }

    pub fn status(&self) -> ComparisonStatus {
        self.status
    }

    pub fn is_same(&self) -> bool {
        self.status.is_same()
    }

    /// Name on the old side, if present there
    pub fn name1(&self) -> Option<&str> {
        self.name1.as_deref()
    }

    /// Name on the new side, if present there
    pub fn name2(&self) -> Option<&str> {
        self.name2.as_deref()
    }

    pub fn old_file(&self) -> Option<&Arc<FileNode>> {
        self.old.as_ref()
    }

    pub fn new_file(&self) -> Option<&Arc<FileNode>> {
        self.new.as_ref()
    }
}

impl PartialEq for LeafComparisonResult {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.name1 == other.name1
            && self.name2 == other.name2
            && self.status == other.status
    }
}

impl Eq for LeafComparisonResult {}

impl Node for LeafComparisonResult {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Directory of a comparison result tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonDirNode {
    name: String,
    root: Option<String>,
    name1: Option<String>,
    name2: Option<String>,
    status: ComparisonStatus,
    leaves: Vec<LeafComparisonResult>,
    dirs: Vec<ComparisonDirNode>,
}

impl ComparisonDirNode {
    /// Build a result directory from the names it had on each side and its child
    /// results. Children are sorted by exact name and the directory is identical
    /// only if it exists on both sides and every child is identical.
    pub fn new(
        name1: Option<&str>,
        name2: Option<&str>,
        mut leaves: Vec<LeafComparisonResult>,
        mut dirs: Vec<ComparisonDirNode>,
    ) -> Self {
        leaves.sort_by(|a, b| a.name().cmp(b.name()));
        dirs.sort_by(|a, b| a.name().cmp(b.name()));

        let status = match (name1, name2) {
            (Some(_), Some(_)) => ComparisonStatus::both(
                leaves.iter().all(LeafComparisonResult::is_same)
                    && dirs.iter().all(ComparisonDirNode::is_same),
            ),
            (Some(_), None) => ComparisonStatus::only_old(),
            _ => ComparisonStatus::only_new(),
        };

        ComparisonDirNode {
            name: name1.or(name2).unwrap_or_default().to_string(),
            root: None,
            name1: name1.map(str::to_string),
            name2: name2.map(str::to_string),
            status,
            leaves,
            dirs,
        }
    }

    pub fn with_root(mut self, root: Option<String>) -> Self {
        self.root = root;
        self
    }

    pub fn status(&self) -> ComparisonStatus {
        self.status
    }

    pub fn is_same(&self) -> bool {
        self.status.is_same()
    }

    pub fn name1(&self) -> Option<&str> {
        self.name1.as_deref()
    }

    pub fn name2(&self) -> Option<&str> {
        self.name2.as_deref()
    }

    pub fn leaves(&self) -> &[LeafComparisonResult] {
        &self.leaves
    }

    pub fn dirs(&self) -> &[ComparisonDirNode] {
        &self.dirs
    }

    pub fn leaf(&self, name: &str) -> Option<&LeafComparisonResult> {
        self.leaves.iter().find(|leaf| leaf.name() == name)
    }

    pub fn dir(&self, name: &str) -> Option<&ComparisonDirNode> {
        self.dirs.iter().find(|dir| dir.name() == name)
    }

    /// Reportable entries in name order
    ///
    /// Every leaf is listed. Directories present on both sides are descended into
    /// without being listed themselves; one-sided directories are listed once and
    /// not descended into.
    pub fn entries(&self) -> Vec<ComparisonEntry> {
        let mut entries = Vec::new();
        self.collect_entries(&mut Vec::new(), &mut entries);
        entries
    }

    fn collect_entries<'a>(&'a self, prefix: &mut Vec<&'a str>, entries: &mut Vec<ComparisonEntry>) {
        let mut leaves = self.leaves.iter().peekable();
        let mut dirs = self.dirs.iter().peekable();

        loop {
            let take_leaf = match (leaves.peek(), dirs.peek()) {
                (Some(leaf), Some(dir)) => leaf.name() <= dir.name(),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_leaf && let Some(leaf) = leaves.next() {
                prefix.push(leaf.name());
                entries.push(ComparisonEntry {
                    path: display_path(None, prefix.as_slice()),
                    renamed_to: leaf.name2().filter(|name| *name != leaf.name()).map(str::to_string),
                    status: leaf.status().entry_status(),
                    kind: EntryKind::File,
                });
                prefix.pop();
            } else if let Some(dir) = dirs.next() {
                prefix.push(dir.name());
                match dir.status().entry_status() {
                    status @ (EntryStatus::OnlyOld | EntryStatus::OnlyNew) => {
                        entries.push(ComparisonEntry {
                            path: display_path(None, prefix.as_slice()),
                            renamed_to: None,
                            status,
                            kind: EntryKind::Directory,
                        });
                    }
                    _ => dir.collect_entries(prefix, entries),
                }
                prefix.pop();
            }
        }
    }

    pub fn summary(&self) -> ComparisonSummary {
        self.entries()
            .iter()
            .fold(ComparisonSummary::default(), |mut summary, entry| {
                summary.record(entry.status);
                summary
            })
    }
}

impl Node for ComparisonDirNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Flattened view of one result entry, relative to the compared roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEntry {
    pub path: String,
    /// New-side name when it differs from the old-side one (case-insensitive match)
    pub renamed_to: Option<String>,
    pub status: EntryStatus,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub same: usize,
    pub different: usize,
    pub only_old: usize,
    pub only_new: usize,
}

impl ComparisonSummary {
    fn record(&mut self, status: EntryStatus) {
        match status {
            EntryStatus::Same => self.same += 1,
            EntryStatus::Different => self.different += 1,
            EntryStatus::OnlyOld => self.only_old += 1,
            EntryStatus::OnlyNew => self.only_new += 1,
        }
    }

    pub fn has_differences(&self) -> bool {
        self.different + self.only_old + self.only_new > 0
    }
}

impl std::fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} identical, {} different, {} only in old, {} only in new",
            self.same, self.different, self.only_old, self.only_new
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::memory::MemorySource;
    use crate::artifacts::nodes::file_node::FileType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn file(name: &str) -> Arc<FileNode> {
        Arc::new(FileNode::new(
            name.to_string(),
            FileType::Regular,
            0,
            Arc::new(MemorySource::new("")),
        ))
    }

    #[rstest]
    #[case(ComparisonStatus::only_old(), EntryStatus::OnlyOld)]
    #[case(ComparisonStatus::only_new(), EntryStatus::OnlyNew)]
    #[case(ComparisonStatus::both(true), EntryStatus::Same)]
    #[case(ComparisonStatus::both(false), EntryStatus::Different)]
    fn status_maps_to_entry_status(#[case] status: ComparisonStatus, #[case] expected: EntryStatus) {
        assert_eq!(status.entry_status(), expected);
        assert!(!status.is_same() || (!status.missing1() && !status.missing2()));
    }

    #[test]
    fn directory_is_same_only_when_all_children_are() {
        let same = ComparisonDirNode::new(
            Some("d"),
            Some("d"),
            vec![LeafComparisonResult::paired(file("a"), file("a"), true)],
            vec![],
        );
        assert!(same.is_same());

        let nested_difference = ComparisonDirNode::new(
            Some("top"),
            Some("top"),
            vec![LeafComparisonResult::paired(file("a"), file("a"), true)],
            vec![ComparisonDirNode::new(
                Some("d"),
                Some("d"),
                vec![LeafComparisonResult::only_new(file("b"))],
                vec![],
            )],
        );
        assert!(!nested_difference.is_same());
    }

    #[test]
    fn one_sided_directory_is_never_same() {
        let dir = ComparisonDirNode::new(Some("gone"), None, vec![], vec![]);

        assert_eq!(dir.status().entry_status(), EntryStatus::OnlyOld);
        assert!(!dir.is_same());
    }

    #[test]
    fn children_are_sorted_by_exact_name() {
        let dir = ComparisonDirNode::new(
            Some(""),
            Some(""),
            vec![
                LeafComparisonResult::only_old(file("b")),
                LeafComparisonResult::only_old(file("B")),
                LeafComparisonResult::only_old(file("a")),
            ],
            vec![],
        );

        let names = dir.leaves().iter().map(|l| l.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "a", "b"]);
    }

    #[test]
    fn entries_interleave_files_and_directories() {
        let tree = ComparisonDirNode::new(
            Some(""),
            Some(""),
            vec![
                LeafComparisonResult::paired(file("z.txt"), file("z.txt"), true),
                LeafComparisonResult::only_new(file("a.txt")),
            ],
            vec![
                ComparisonDirNode::new(
                    Some("m"),
                    Some("m"),
                    vec![LeafComparisonResult::paired(file("x"), file("x"), false)],
                    vec![],
                ),
                ComparisonDirNode::new(None, Some("n"), vec![], vec![]),
            ],
        );

        let entries = tree
            .entries()
            .into_iter()
            .map(|entry| (entry.path, entry.status))
            .collect::<Vec<_>>();

        assert_eq!(
            entries,
            vec![
                ("a.txt".to_string(), EntryStatus::OnlyNew),
                ("m/x".to_string(), EntryStatus::Different),
                ("n".to_string(), EntryStatus::OnlyNew),
                ("z.txt".to_string(), EntryStatus::Same),
            ]
        );
        assert_eq!(
            tree.summary(),
            ComparisonSummary {
                same: 1,
                different: 1,
                only_old: 0,
                only_new: 2,
            }
        );
    }
}
