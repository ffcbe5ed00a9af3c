use crate::artifacts::errors::ErrorHandler;
use crate::artifacts::nodes::DirNode;

/// Produces a complete tree from some external source
///
/// Access failures on individual entries go to `handler`; when it chooses to keep
/// going the entry is left out of the tree. The returned tree does not have to be
/// sorted.
pub trait TreeBuilder {
    /// Human readable name of the source, used as the tree's root marker
    fn describe(&self) -> String;

    fn build(&self, handler: &mut dyn ErrorHandler) -> anyhow::Result<DirNode>;
}
