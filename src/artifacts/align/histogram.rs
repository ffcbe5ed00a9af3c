use crate::artifacts::nodes::{DirNode, Node};
use std::cmp::Ordering;
use std::collections::{BTreeMap, btree_map};
use std::iter::Peekable;

type DepthCounts = BTreeMap<usize, usize>;

/// Multiset of `(name, depth)` pairs of one tree
///
/// The immediate children of the root sit at depth 0; the root itself is not
/// counted. Leaves and directories are counted alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDepths {
    names: BTreeMap<String, DepthCounts>,
    size: usize,
}

impl NameDepths {
    pub fn of(root: &DirNode) -> Self {
        let mut depths = NameDepths::default();
        depths.collect(root, 0);
        depths
    }

    fn collect(&mut self, dir: &DirNode, depth: usize) {
        for leaf in dir.leaves() {
            self.record(leaf.name(), depth);
        }
        for sub_dir in dir.dirs() {
            self.record(sub_dir.name(), depth);
            self.collect(sub_dir, depth + 1);
        }
    }

    fn record(&mut self, name: &str, depth: usize) {
        *self
            .names
            .entry(name.to_string())
            .or_default()
            .entry(depth)
            .or_default() += 1;
        self.size += 1;
    }

    /// Number of recorded entries, duplicates included
    pub fn size(&self) -> usize {
        self.size
    }

    /// How many times `name` was seen at `depth`
    pub fn multiplicity(&self, name: &str, depth: usize) -> usize {
        self.names
            .get(name)
            .and_then(|depths| depths.get(&depth))
            .copied()
            .unwrap_or_default()
    }

    /// Match counts keyed by `self` depth minus `other` depth
    ///
    /// Both name lists are walked in order like a merge join. For a name present on
    /// both sides every pair of depths contributes the smaller of the two
    /// multiplicities, so duplicated names never match more often than they occur.
    pub fn offset_histogram(&self, other: &NameDepths) -> DepthHistogram {
        let mut histogram = DepthHistogram::default();

        for (ours, theirs) in MergeJoin::new(self.names.iter(), other.names.iter()) {
            for (&depth1, &count1) in ours {
                for (&depth2, &count2) in theirs {
                    histogram.add(depth1 as isize - depth2 as isize, count1.min(count2));
                }
            }
        }

        histogram
    }
}

/// Yields the values of both maps for every key they share
struct MergeJoin<'a> {
    left: Peekable<btree_map::Iter<'a, String, DepthCounts>>,
    right: Peekable<btree_map::Iter<'a, String, DepthCounts>>,
}

impl<'a> MergeJoin<'a> {
    fn new(
        left: btree_map::Iter<'a, String, DepthCounts>,
        right: btree_map::Iter<'a, String, DepthCounts>,
    ) -> Self {
        MergeJoin {
            left: left.peekable(),
            right: right.peekable(),
        }
    }
}

impl<'a> Iterator for MergeJoin<'a> {
    type Item = (&'a DepthCounts, &'a DepthCounts);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ordering = {
                let (left, _) = self.left.peek()?;
                let (right, _) = self.right.peek()?;
                left.cmp(right)
            };

            match ordering {
                Ordering::Less => {
                    self.left.next();
                }
                Ordering::Greater => {
                    self.right.next();
                }
                Ordering::Equal => {
                    let (_, ours) = self.left.next()?;
                    let (_, theirs) = self.right.next()?;
                    return Some((ours, theirs));
                }
            }
        }
    }
}

/// Match counts per signed depth offset, remembering the order offsets were first seen in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthHistogram {
    counts: Vec<(isize, usize)>,
}

impl DepthHistogram {
    pub fn add(&mut self, offset: isize, matches: usize) {
        match self.counts.iter_mut().find(|(seen, _)| *seen == offset) {
            Some((_, count)) => *count += matches,
            None => self.counts.push((offset, matches)),
        }
    }

    pub fn count(&self, offset: isize) -> usize {
        self.counts
            .iter()
            .find(|(seen, _)| *seen == offset)
            .map(|(_, count)| *count)
            .unwrap_or_default()
    }

    /// Offset with the most matches; among equal counts the first one seen wins
    pub fn best(&self) -> Option<(isize, usize)> {
        self.counts.iter().copied().fold(None, |best, (offset, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((offset, count)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
