use crate::areas::builder::TreeBuilder;
use crate::artifacts::errors::ErrorHandler;
use crate::artifacts::nodes::DirNode;
use derive_new::new;
use regex::Regex;
use tracing::debug;

/// Tree of another builder minus every entry whose name matches an exclusion pattern
///
/// Patterns match against single entry names, not paths. An excluded directory
/// takes its whole content with it.
#[derive(Debug, new)]
pub struct FilteredTree<B> {
    inner: B,
    exclude: Vec<Regex>,
}

impl<B> FilteredTree<B> {
    /// Compile the given patterns and wrap `inner` with them
    pub fn with_patterns(inner: B, patterns: &[String]) -> anyhow::Result<Self> {
        let exclude = patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(inner, exclude))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|pattern| pattern.is_match(name))
    }
}

impl<B: TreeBuilder> TreeBuilder for FilteredTree<B> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn build(&self, handler: &mut dyn ErrorHandler) -> anyhow::Result<DirNode> {
        let mut tree = self.inner.build(handler)?;

        if !self.exclude.is_empty() {
            let before = tree.entry_count();
            tree.retain(&|name| !self.is_excluded(name));
            debug!(excluded = before - tree.entry_count(), "filtered tree");
        }

        Ok(tree)
    }
}
