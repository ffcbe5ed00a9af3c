//! Pairing of same-named children
//!
//! Children of two directories are split into pairs present on both sides and
//! leftovers present on one side only, first by exact name and then, when asked
//! for, by lower-cased name. The same code pairs leaves and sub-directories.

use crate::artifacts::errors::CompareError;
use crate::artifacts::nodes::Node;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Children matched across both sides; at least one side is always present
#[derive(Debug)]
pub struct Pairing<N> {
    pub old: Option<Arc<N>>,
    pub new: Option<Arc<N>>,
}

impl<N: Node> Pairing<N> {
    pub fn name(&self) -> &str {
        self.old
            .as_deref()
            .or(self.new.as_deref())
            .map(Node::name)
            .unwrap_or_default()
    }
}

type NameIndex<'n, N> = BTreeMap<String, &'n Arc<N>>;

/// Pair the children of two directories by name
///
/// Pairings come out sorted by name (old-side name for matched pairs).
pub fn partition<N: Node>(
    old: &[Arc<N>],
    new: &[Arc<N>],
    ignore_case: bool,
) -> Result<Vec<Pairing<N>>, CompareError> {
    let old_index = index_by_name(old)?;
    let mut new_index = index_by_name(new)?;

    let mut pairings = Vec::new();
    let mut only_old = Vec::new();

    for (name, node) in old_index {
        match new_index.remove(&name) {
            Some(other) => pairings.push(Pairing {
                old: Some(Arc::clone(node)),
                new: Some(Arc::clone(other)),
            }),
            None => only_old.push(node),
        }
    }
    let only_new = new_index.into_values().collect::<Vec<_>>();

    if ignore_case && !only_old.is_empty() && !only_new.is_empty() {
        let old_slots = case_slots(&only_old);
        let mut new_slots = case_slots(&only_new);

        for (key, node) in old_slots {
            pairings.push(Pairing {
                old: Some(Arc::clone(node)),
                new: new_slots.remove(&key).map(Arc::clone),
            });
        }
        pairings.extend(new_slots.into_values().map(|node| Pairing {
            old: None,
            new: Some(Arc::clone(node)),
        }));
    } else {
        pairings.extend(only_old.into_iter().map(|node| Pairing {
            old: Some(Arc::clone(node)),
            new: None,
        }));
        pairings.extend(only_new.into_iter().map(|node| Pairing {
            old: None,
            new: Some(Arc::clone(node)),
        }));
    }

    pairings.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(pairings)
}

fn index_by_name<N: Node>(nodes: &[Arc<N>]) -> Result<NameIndex<'_, N>, CompareError> {
    let mut index = BTreeMap::new();

    for node in nodes {
        if index.insert(node.name().to_string(), node).is_some() {
            return Err(CompareError::DuplicateName {
                name: node.name().to_string(),
            });
        }
    }

    Ok(index)
}

/// Index leftovers by lower-cased name
///
/// When several names fold to the same key, the one already in lower case owns the
/// key; otherwise the first in name order does. Losers stay reachable under their
/// exact name, which no lower-cased key can be equal to.
fn case_slots<'n, N: Node>(nodes: &[&'n Arc<N>]) -> NameIndex<'n, N> {
    let mut slots: NameIndex<'n, N> = BTreeMap::new();

    for &node in nodes {
        let folded = node.name().to_lowercase();

        match slots.get(&folded).copied() {
            None => {
                slots.insert(folded, node);
            }
            Some(holder) if node.name() == folded => {
                slots.insert(folded, node);
                slots.insert(holder.name().to_string(), holder);
            }
            Some(_) => {
                slots.insert(node.name().to_string(), node);
            }
        }
    }

    slots
}
