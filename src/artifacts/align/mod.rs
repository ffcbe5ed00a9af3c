//! Alignment of trees rooted at different depths
//!
//! An archive whose entries all live under `a/b/` and a directory holding the
//! content of `b/` share nothing root to root. Counting how often the same name
//! shows up at the same relative depth tells how many levels one side has to be
//! descended into before the two line up.
//!
//! - `histogram`: the per-tree name/depth multiset and the offset histogram
//! - `analyser`: best offset, match factor and best sub-tree search

pub mod analyser;
pub mod histogram;

pub use analyser::{best_sub_tree, find_best_depth_alignment, match_count, match_factor};
pub use histogram::{DepthHistogram, NameDepths};
