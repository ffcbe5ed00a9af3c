//! Compare controller
//!
//! Owns the old and new trees, decides which node of each one is compared (its
//! effective root) and publishes the comparison result.
//!
//! Each side is either unset or holds a built tree plus an [`Anchor`] saying where
//! its effective root sits: at the tree root, at a sub-directory picked by
//! automatic alignment, or at a node the caller forced. Every public operation is
//! a single transition that recomputes what it invalidates:
//!
//! - `set_root` rebuilds one side and resets the other side's alignment unless it
//!   is forced.
//! - `force_root` / `unforce_root` pin or release one side's effective root and
//!   reset the other side's alignment unless it is forced.
//! - `compare` realigns the unforced sides from their tree roots and publishes a
//!   fresh result. Calling it twice in a row gives the same result.
//! - changing flags drops the published result until the next `compare`.

use crate::areas::builder::TreeBuilder;
use crate::areas::listeners::Listeners;
use crate::artifacts::align::{best_sub_tree, find_best_depth_alignment};
use crate::artifacts::compare::{CompareFlags, TreeComparor};
use crate::artifacts::errors::{CompareError, ErrorHandler};
use crate::artifacts::nodes::{ComparisonDirNode, DirNode, Node, NodeRef, display_path};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Old,
    New,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Old => Role::New,
            Role::New => Role::Old,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Old => "old",
            Role::New => "new",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" | "1" => Ok(Role::Old),
            "new" | "2" => Ok(Role::New),
            _ => Err(CompareError::UnknownRole(s.to_string())),
        }
    }
}

/// Where a side's effective root sits inside its tree
#[derive(Debug, Clone)]
enum Anchor {
    Root,
    Aligned { path: Vec<String>, node: Arc<DirNode> },
    /// `wraps_leaf` is set when `path` ends at a file wrapped into `node`
    Forced {
        path: Vec<String>,
        node: Arc<DirNode>,
        wraps_leaf: bool,
    },
}

#[derive(Debug, Clone)]
struct Side {
    tree: Arc<DirNode>,
    anchor: Anchor,
}

impl Side {
    fn new(tree: DirNode) -> Self {
        Side {
            tree: Arc::new(tree),
            anchor: Anchor::Root,
        }
    }

    fn effective(&self) -> &Arc<DirNode> {
        match &self.anchor {
            Anchor::Root => &self.tree,
            Anchor::Aligned { node, .. } | Anchor::Forced { node, .. } => node,
        }
    }

    fn effective_path(&self) -> &[String] {
        match &self.anchor {
            Anchor::Root => &[],
            Anchor::Aligned { path, .. } | Anchor::Forced { path, .. } => path,
        }
    }

    fn is_forced(&self) -> bool {
        matches!(self.anchor, Anchor::Forced { .. })
    }

    fn reset_unless_forced(&mut self) {
        if !self.is_forced() {
            self.anchor = Anchor::Root;
        }
    }

    /// Move the effective root `depth` levels down, towards the sub-tree best matching `other`
    fn descend(&mut self, other: &DirNode, depth: usize) {
        let path = best_sub_tree(&self.tree, other, depth);

        if let Some((node, _)) = path.split_last()
            && path.len() > 1
        {
            self.anchor = Anchor::Aligned {
                path: path[1..].iter().map(|dir| dir.name().to_string()).collect(),
                node: Arc::clone(node),
            };
        }
    }

    /// Display path of the effective root
    ///
    /// A wrapped file is listed inside the marker's directory, so the marker stops
    /// at that directory.
    fn label(&self) -> String {
        let path = self.effective_path();
        let path = match self.anchor {
            Anchor::Forced {
                wraps_leaf: true, ..
            } => &path[..path.len().saturating_sub(1)],
            _ => path,
        };

        display_path(self.tree.root(), path)
    }

    /// Effective root carrying a root marker that shows where it sits
    fn rooted_effective(&self) -> DirNode {
        let mut node = DirNode::clone(self.effective());
        node.set_root(self.label());
        node
    }
}

#[derive(Debug, Default)]
pub struct CompareController {
    flags: CompareFlags,
    old: Option<Side>,
    new: Option<Side>,
    result: Option<Arc<ComparisonDirNode>>,
    old_listeners: Listeners<DirNode>,
    new_listeners: Listeners<DirNode>,
    compare_listeners: Listeners<ComparisonDirNode>,
}

impl CompareController {
    pub fn new(flags: CompareFlags) -> Self {
        CompareController {
            flags,
            ..Default::default()
        }
    }

    pub fn flags(&self) -> CompareFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: CompareFlags) {
        if self.flags != flags {
            self.flags = flags;
            self.invalidate();
        }
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.set_flag(CompareFlags::IGNORE_CASE, ignore_case);
    }

    pub fn set_text(&mut self, text: bool) {
        self.set_flag(CompareFlags::TEXT, text);
    }

    fn set_flag(&mut self, flag: CompareFlags, value: bool) {
        let mut flags = self.flags;
        flags.set(flag, value);
        self.set_flags(flags);
    }

    /// Build the tree of one side from scratch
    ///
    /// The new tree is sorted and compared from its root; the other side goes back
    /// to its own root unless it is forced.
    pub fn set_root(
        &mut self,
        role: Role,
        builder: &dyn TreeBuilder,
        handler: &mut dyn ErrorHandler,
    ) -> anyhow::Result<()> {
        let mut tree = builder.build(handler)?;
        tree.sort();
        if tree.root().is_none() {
            tree.set_root(builder.describe());
        }
        info!(%role, source = %builder.describe(), entries = tree.entry_count(), "root set");

        *self.side_slot(role) = Some(Side::new(tree));
        if let Some(other) = self.side_slot(role.other()) {
            other.reset_unless_forced();
        }
        self.invalidate();

        let tree = self.root(role).cloned();
        self.listeners(role).notify(tree.as_ref());
        Ok(())
    }

    /// Pin the effective root of one side to the node at `path` below its tree root
    ///
    /// A path ending at a file pins a nameless directory holding just that file.
    pub fn force_root<S: AsRef<str>>(&mut self, role: Role, path: &[S]) -> anyhow::Result<()> {
        let side = self
            .side_slot(role)
            .as_mut()
            .ok_or(CompareError::RootNotSet(role))?;

        let resolved = side.tree.resolve_path(path);
        let wraps_leaf = resolved.is_resolved() && matches!(resolved.last(), Some(NodeRef::Leaf(_)));
        let node = resolved
            .into_dir()
            .ok_or_else(|| CompareError::UnresolvedPath {
                role,
                path: display_path(None, path),
            })?;
        debug!(%role, path = %display_path(None, path), "forcing compare root");

        side.anchor = Anchor::Forced {
            path: path.iter().map(|name| name.as_ref().to_string()).collect(),
            node,
            wraps_leaf,
        };
        if let Some(other) = self.side_slot(role.other()) {
            other.reset_unless_forced();
        }
        self.invalidate();
        Ok(())
    }

    /// Release a forced root; both unforced sides go back to their tree roots
    pub fn unforce_root(&mut self, role: Role) -> anyhow::Result<()> {
        let side = self
            .side_slot(role)
            .as_mut()
            .ok_or(CompareError::RootNotSet(role))?;
        side.anchor = Anchor::Root;

        if let Some(other) = self.side_slot(role.other()) {
            other.reset_unless_forced();
        }
        self.invalidate();
        Ok(())
    }

    /// Align the unforced sides and compare the effective roots
    ///
    /// Does nothing and returns `None` until both trees are set.
    pub fn compare(
        &mut self,
        handler: &mut dyn ErrorHandler,
    ) -> anyhow::Result<Option<Arc<ComparisonDirNode>>> {
        if self.align().is_none() {
            return Ok(None);
        }
        let (Some(old), Some(new)) = (self.old.as_ref(), self.new.as_ref()) else {
            return Ok(None);
        };

        let (old, new) = (old.rooted_effective(), new.rooted_effective());
        let result = TreeComparor::new(self.flags, handler).compare(Some(&old), Some(&new))?;
        let result = Arc::new(result);
        info!(summary = %result.summary(), "comparison finished");

        self.result = Some(Arc::clone(&result));
        self.compare_listeners.notify(Some(&result));
        Ok(Some(result))
    }

    /// Move the effective roots to where the next comparison starts
    ///
    /// Unforced sides go back to their tree roots; with automatic alignment on,
    /// the side with extra levels on top then descends towards the other one.
    /// Returns the best depth offset (0 when alignment did not run), or `None`
    /// until both trees are set.
    pub fn align(&mut self) -> Option<isize> {
        let (Some(old), Some(new)) = (self.old.as_mut(), self.new.as_mut()) else {
            return None;
        };

        old.reset_unless_forced();
        new.reset_unless_forced();

        if !self.flags.contains(CompareFlags::AUTO_ALIGN) || (old.is_forced() && new.is_forced()) {
            return Some(0);
        }

        let offset = find_best_depth_alignment(old.effective(), new.effective());
        if offset > 0 && !old.is_forced() {
            let target = Arc::clone(new.effective());
            old.descend(&target, offset.unsigned_abs());
        } else if offset < 0 && !new.is_forced() {
            let target = Arc::clone(old.effective());
            new.descend(&target, offset.unsigned_abs());
        }
        debug!(
            offset,
            old = %display_path(None, old.effective_path()),
            new = %display_path(None, new.effective_path()),
            "aligned compare roots"
        );

        Some(offset)
    }

    /// Last published comparison, `None` when it has been invalidated since
    pub fn result(&self) -> Option<&Arc<ComparisonDirNode>> {
        self.result.as_ref()
    }

    /// Tree root of one side
    pub fn root(&self, role: Role) -> Option<&Arc<DirNode>> {
        self.side(role).map(|side| &side.tree)
    }

    /// Node of one side used as comparison input
    pub fn compare_root(&self, role: Role) -> Option<&Arc<DirNode>> {
        self.side(role).map(Side::effective)
    }

    /// Names leading from the tree root to the effective root of one side
    pub fn compare_path(&self, role: Role) -> Option<&[String]> {
        self.side(role).map(Side::effective_path)
    }

    /// Display path of the node of one side used as comparison input
    pub fn compare_label(&self, role: Role) -> Option<String> {
        self.side(role).map(Side::label)
    }

    pub fn is_forced(&self, role: Role) -> bool {
        self.side(role).is_some_and(Side::is_forced)
    }

    pub fn on_root_changed(&mut self, role: Role, listener: impl FnMut(Option<&Arc<DirNode>>) + 'static) {
        self.listeners(role).add(listener);
    }

    pub fn on_result_changed(
        &mut self,
        listener: impl FnMut(Option<&Arc<ComparisonDirNode>>) + 'static,
    ) {
        self.compare_listeners.add(listener);
    }

    fn invalidate(&mut self) {
        if self.result.take().is_some() {
            self.compare_listeners.notify(None);
        }
    }

    fn side(&self, role: Role) -> Option<&Side> {
        match role {
            Role::Old => self.old.as_ref(),
            Role::New => self.new.as_ref(),
        }
    }

    fn side_slot(&mut self, role: Role) -> &mut Option<Side> {
        match role {
            Role::Old => &mut self.old,
            Role::New => &mut self.new,
        }
    }

    fn listeners(&mut self, role: Role) -> &mut Listeners<DirNode> {
        match role {
            Role::Old => &mut self.old_listeners,
            Role::New => &mut self.new_listeners,
        }
    }
}
