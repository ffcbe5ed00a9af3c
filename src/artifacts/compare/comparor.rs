use crate::artifacts::compare::flags::CompareFlags;
use crate::artifacts::compare::partition::{Pairing, partition};
use crate::artifacts::content::inspector::Inspector;
use crate::artifacts::errors::{CompareError, ErrorHandler};
use crate::artifacts::nodes::{
    ComparisonDirNode, DirNode, FileNode, LeafComparisonResult, Node,
};
use std::sync::Arc;
use tracing::debug;

/// Walks two trees side by side and builds their comparison result tree
///
/// Content read failures are offered to the error handler: when it lets the
/// comparison continue the affected pair is reported as different, otherwise the
/// failure aborts the walk. Configuration errors ([`CompareError`]) always abort.
pub struct TreeComparor<'h> {
    flags: CompareFlags,
    inspector: Inspector,
    handler: &'h mut dyn ErrorHandler,
}

impl<'h> TreeComparor<'h> {
    pub fn new(flags: CompareFlags, handler: &'h mut dyn ErrorHandler) -> Self {
        TreeComparor {
            flags,
            inspector: Inspector::new(flags.contains(CompareFlags::TEXT)),
            handler,
        }
    }

    /// Compare two directories, either of which may be missing
    pub fn compare(
        &mut self,
        old: Option<&DirNode>,
        new: Option<&DirNode>,
    ) -> anyhow::Result<ComparisonDirNode> {
        if old.is_none() && new.is_none() {
            anyhow::bail!("at least one directory is needed for a comparison");
        }

        let ignore_case = self.flags.contains(CompareFlags::IGNORE_CASE);
        let no_leaves: &[Arc<FileNode>] = &[];
        let no_dirs: &[Arc<DirNode>] = &[];

        let leaf_pairings = partition(
            old.map_or(no_leaves, DirNode::leaves),
            new.map_or(no_leaves, DirNode::leaves),
            ignore_case,
        )?;
        let dir_pairings = partition(
            old.map_or(no_dirs, DirNode::dirs),
            new.map_or(no_dirs, DirNode::dirs),
            ignore_case,
        )?;

        let leaves = leaf_pairings
            .into_iter()
            .map(|pairing| self.compare_leaves(pairing))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let dirs = dir_pairings
            .into_iter()
            .map(|pairing| self.compare(pairing.old.as_deref(), pairing.new.as_deref()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ComparisonDirNode::new(
            old.map(Node::name),
            new.map(Node::name),
            leaves,
            dirs,
        )
        .with_root(old.or(new).and_then(Node::root).map(str::to_string)))
    }

    fn compare_leaves(&mut self, pairing: Pairing<FileNode>) -> anyhow::Result<LeafComparisonResult> {
        match (pairing.old, pairing.new) {
            (Some(old), Some(new)) => {
                let same = self.content_equal(&old, &new)?;
                Ok(LeafComparisonResult::paired(old, new, same))
            }
            (Some(old), None) => Ok(LeafComparisonResult::only_old(old)),
            (None, Some(new)) => Ok(LeafComparisonResult::only_new(new)),
            (None, None) => anyhow::bail!("empty leaf pairing"),
        }
    }

    fn content_equal(&mut self, old: &FileNode, new: &FileNode) -> anyhow::Result<bool> {
        match self.inspector.content_equal(old, new) {
            Ok(same) => Ok(same),
            Err(error) if CompareError::is_fatal(&error) => Err(error),
            Err(error) => {
                let error = error.context(format!("Unable to compare content of {}", old.name()));
                if self.handler.handle_error(&error) {
                    debug!(file = old.name(), "treating unreadable pair as different");
                    Ok(false)
                } else {
                    Err(error)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::memory::{MemorySource, MemoryTree};
    use crate::artifacts::errors::{ErrorPolicy, ReportingErrorHandler};
    use crate::artifacts::nodes::{ComparisonStatus, ContentMethod, Cost, EntryStatus};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::io::Read;

    fn compare_trees(
        old: &MemoryTree,
        new: &MemoryTree,
        flags: CompareFlags,
    ) -> anyhow::Result<ComparisonDirNode> {
        let mut handler = ReportingErrorHandler::default();
        let old = old.to_tree();
        let new = new.to_tree();

        TreeComparor::new(flags, &mut handler).compare(Some(&old), Some(&new))
    }

    fn statuses(result: &ComparisonDirNode) -> Vec<(String, EntryStatus)> {
        result
            .entries()
            .into_iter()
            .map(|entry| (entry.path, entry.status))
            .collect()
    }

    fn assert_invariants(dir: &ComparisonDirNode) {
        let statuses = dir
            .leaves()
            .iter()
            .map(LeafComparisonResult::status)
            .chain(std::iter::once(dir.status()));

        for status in statuses {
            if status.is_same() {
                assert!(!status.missing1() && !status.missing2());
            }
            if status.missing1() || status.missing2() {
                assert_ne!(status.missing1(), status.missing2());
                assert!(!status.is_same());
            }
        }

        dir.dirs().iter().for_each(assert_invariants);
    }

    #[derive(Debug)]
    struct UnreadableSource;

    impl crate::artifacts::nodes::ContentSource for UnreadableSource {
        fn cost(&self, _method: ContentMethod) -> Cost {
            Cost::Moderate
        }

        fn open(&self) -> anyhow::Result<Box<dyn Read + '_>> {
            Err(anyhow::anyhow!("permission denied"))
        }
    }

    #[test]
    fn reports_modified_and_added_files() -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("d/f1", "one");
        let new = MemoryTree::new("B").file("d/f1", "uno").file("d/f2", "two");

        let result = compare_trees(&old, &new, CompareFlags::empty())?;
        let d = result.dir("d").expect("d is compared");

        assert!(!d.is_same());
        assert_eq!(d.leaf("f1").map(LeafComparisonResult::status), Some(ComparisonStatus::both(false)));
        assert_eq!(d.leaf("f2").map(LeafComparisonResult::status), Some(ComparisonStatus::only_new()));
        assert_invariants(&result);

        Ok(())
    }

    #[test]
    fn identical_trees_are_same_at_every_level() -> anyhow::Result<()> {
        let tree = MemoryTree::new("T")
            .file("a.txt", "a")
            .file("x/y/z.bin", vec![0u8, 1, 2])
            .dir("empty");

        let result = compare_trees(&tree, &tree, CompareFlags::empty())?;

        assert!(result.is_same());
        assert!(result.dir("empty").is_some_and(ComparisonDirNode::is_same));
        Ok(())
    }

    #[test]
    fn one_sided_directories_are_expanded_one_sided() -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("gone/deep/file", "x");
        let new = MemoryTree::new("B");

        let result = compare_trees(&old, &new, CompareFlags::empty())?;
        let gone = result.dir("gone").expect("gone is reported");

        assert_eq!(gone.status(), ComparisonStatus::only_old());
        assert_eq!(
            gone.dir("deep").and_then(|deep| deep.leaf("file")).map(LeafComparisonResult::status),
            Some(ComparisonStatus::only_old())
        );
        assert_eq!(statuses(&result), vec![("gone".to_string(), EntryStatus::OnlyOld)]);
        Ok(())
    }

    #[rstest]
    #[case(CompareFlags::empty(), vec![("File".to_string(), EntryStatus::OnlyOld), ("file".to_string(), EntryStatus::OnlyNew)])]
    #[case(CompareFlags::IGNORE_CASE, vec![("File".to_string(), EntryStatus::Same)])]
    fn case_insensitive_matching_reunites_leaves(
        #[case] flags: CompareFlags,
        #[case] expected: Vec<(String, EntryStatus)>,
    ) -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("File", "same");
        let new = MemoryTree::new("B").file("file", "same");

        let result = compare_trees(&old, &new, flags)?;

        assert_eq!(statuses(&result), expected);
        assert_invariants(&result);
        Ok(())
    }

    #[test]
    fn reunited_pair_keeps_both_names() -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("Notes.TXT", "a");
        let new = MemoryTree::new("B").file("notes.txt", "b");

        let result = compare_trees(&old, &new, CompareFlags::IGNORE_CASE)?;
        let leaf = result.leaf("Notes.TXT").expect("paired");

        assert_eq!(leaf.name1(), Some("Notes.TXT"));
        assert_eq!(leaf.name2(), Some("notes.txt"));
        assert_eq!(leaf.status(), ComparisonStatus::both(false));
        Ok(())
    }

    #[test]
    fn text_flag_ignores_line_terminators() -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("readme", "a\r\nb\r\n");
        let new = MemoryTree::new("B").file("readme", "a\nb\n");

        assert!(!compare_trees(&old, &new, CompareFlags::empty())?.is_same());
        assert!(compare_trees(&old, &new, CompareFlags::TEXT)?.is_same());
        Ok(())
    }

    #[test]
    fn ignored_read_failure_marks_pair_different() -> anyhow::Result<()> {
        let old = MemoryTree::new("A").file("ok", "1").source("locked", UnreadableSource, 4);
        let new = MemoryTree::new("B").file("ok", "1").source("locked", UnreadableSource, 4);
        let (old, new) = (old.to_tree(), new.to_tree());

        let mut handler = ReportingErrorHandler::new(ErrorPolicy::Ignore);
        let result = TreeComparor::new(CompareFlags::empty(), &mut handler)
            .compare(Some(&old), Some(&new))?;

        assert_eq!(result.leaf("ok").map(LeafComparisonResult::is_same), Some(true));
        assert_eq!(result.leaf("locked").map(LeafComparisonResult::status), Some(ComparisonStatus::both(false)));
        assert!(handler.has_errors());
        assert_eq!(handler.messages().len(), 1);
        Ok(())
    }

    #[test]
    fn aborting_handler_stops_the_comparison() {
        let old = MemoryTree::new("A").source("locked", UnreadableSource, 4).to_tree();
        let new = MemoryTree::new("B").source("locked", UnreadableSource, 4).to_tree();

        let mut handler = ReportingErrorHandler::new(ErrorPolicy::Abort);
        let result = TreeComparor::new(CompareFlags::empty(), &mut handler)
            .compare(Some(&old), Some(&new));

        assert!(result.is_err());
        assert!(handler.has_errors());
    }

    #[rstest]
    #[case(ErrorPolicy::Ignore)]
    #[case(ErrorPolicy::Abort)]
    fn failed_text_guess_goes_through_the_handler(#[case] policy: ErrorPolicy) {
        let old = MemoryTree::new("A").source("f", UnreadableSource, 3).to_tree();
        let new = MemoryTree::new("B").file("f", "abc").to_tree();

        let mut handler = ReportingErrorHandler::new(policy);
        let result = TreeComparor::new(CompareFlags::TEXT, &mut handler)
            .compare(Some(&old), Some(&new));

        match policy {
            ErrorPolicy::Ignore => {
                let status = result
                    .ok()
                    .and_then(|result| result.leaf("f").map(LeafComparisonResult::status));
                assert_eq!(status, Some(ComparisonStatus::both(false)));
            }
            ErrorPolicy::Abort => assert!(result.is_err()),
        }
        assert!(handler.has_errors());
        assert_eq!(handler.messages().len(), 1);
    }

    #[test]
    fn configuration_errors_bypass_the_handler() {
        let old = MemoryTree::new("A")
            .source("f", MemorySource::snapshot("abc"), 3)
            .to_tree();
        let new = MemoryTree::new("B")
            .source("f", MemorySource::archived("abc"), 3)
            .to_tree();

        let mut handler = ReportingErrorHandler::new(ErrorPolicy::Ignore);
        let error = TreeComparor::new(CompareFlags::empty(), &mut handler)
            .compare(Some(&old), Some(&new))
            .expect_err("no shared content method");

        assert!(CompareError::is_fatal(&error));
        assert!(!handler.has_errors());
    }

    #[test]
    fn comparing_nothing_is_an_error() {
        let mut handler = ReportingErrorHandler::default();

        assert!(TreeComparor::new(CompareFlags::empty(), &mut handler)
            .compare(None, None)
            .is_err());
    }

    fn arb_tree() -> impl Strategy<Value = MemoryTree> {
        prop::collection::vec(
            (
                prop::collection::vec(prop::sample::select(vec!["a", "b", "B", "c"]), 1..4),
                prop::sample::select(vec!["x", "y"]),
            ),
            0..12,
        )
        .prop_map(|files| {
            files
                .into_iter()
                .fold(MemoryTree::new("arb"), |tree, (segments, content)| {
                    // file names get a distinct prefix so they never collide with directories
                    let mut path = segments.join("/");
                    path.push_str(".f");
                    tree.file(&path, content)
                })
        })
    }

    proptest! {
        #[test]
        fn result_invariants_hold(old in arb_tree(), new in arb_tree(), ignore_case in any::<bool>()) {
            let flags = if ignore_case { CompareFlags::IGNORE_CASE } else { CompareFlags::empty() };
            let result = compare_trees(&old, &new, flags)
                .expect("in-memory comparison");

            assert_invariants(&result);
            prop_assert_eq!(result.is_same(), statuses(&result).iter().all(|(_, s)| *s == EntryStatus::Same));
        }
    }
}
