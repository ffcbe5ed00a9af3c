use crate::artifacts::align::histogram::NameDepths;
use crate::artifacts::nodes::{DirNode, Node};
use std::sync::Arc;
use tracing::debug;

/// Depth offset under which the names of both trees line up best
///
/// The offset is `old` depth minus `new` depth: a positive value means `old` has
/// that many extra levels on top, a negative one means `new` has. Trees sharing no
/// name yield 0. Equal counts go to the offset encountered first.
pub fn find_best_depth_alignment(old: &DirNode, new: &DirNode) -> isize {
    let histogram = NameDepths::of(old).offset_histogram(&NameDepths::of(new));

    match histogram.best() {
        Some((offset, matches)) => {
            debug!(offset, matches, "best depth alignment");
            offset
        }
        None => 0,
    }
}

/// Number of same-name, same-depth pairs between two trees
pub fn match_count(a: &DirNode, b: &DirNode) -> usize {
    NameDepths::of(a).offset_histogram(&NameDepths::of(b)).count(0)
}

/// `2 * matches / (size_a + size_b)` at depth offset 0, within `[0, 1]`
///
/// Two empty trees have a factor of 0.
pub fn match_factor(a: &DirNode, b: &DirNode) -> f64 {
    let (a, b) = (NameDepths::of(a), NameDepths::of(b));
    let total = a.size() + b.size();

    if total == 0 {
        return 0.0;
    }

    2.0 * a.offset_histogram(&b).count(0) as f64 / total as f64
}

/// Path of sub-directories `depth` levels below `root` whose content best matches `other`
///
/// Every directory path of that length is tried. The returned nodes start with
/// `root` and end with the winning sub-tree; the first candidate wins among equal
/// scores. The result is empty when `root` is not that deep.
pub fn best_sub_tree(root: &Arc<DirNode>, other: &DirNode, depth: usize) -> Vec<Arc<DirNode>> {
    let other = NameDepths::of(other);
    let mut best = None;

    search(&mut vec![Arc::clone(root)], depth, &other, &mut best);

    match best {
        Some((score, path)) => {
            debug!(
                score,
                path = %path.iter().map(|dir| dir.name()).collect::<Vec<_>>().join("/"),
                "best sub-tree"
            );
            path
        }
        None => Vec::new(),
    }
}

fn search(
    path: &mut Vec<Arc<DirNode>>,
    remaining: usize,
    other: &NameDepths,
    best: &mut Option<(usize, Vec<Arc<DirNode>>)>,
) {
    let Some(current) = path.last().cloned() else {
        return;
    };

    if remaining == 0 {
        let score = NameDepths::of(&current).offset_histogram(other).count(0);
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            *best = Some((score, path.clone()));
        }
        return;
    }

    for dir in current.dirs() {
        path.push(Arc::clone(dir));
        search(path, remaining - 1, other, best);
        path.pop();
    }
}
