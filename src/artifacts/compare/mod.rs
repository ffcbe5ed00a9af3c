//! Pairwise tree comparison
//!
//! - `flags`: comparison settings
//! - `partition`: name based pairing of the children of two directories
//! - `comparor`: the recursive walk producing a comparison result tree

pub mod comparor;
pub mod flags;
pub mod partition;

pub use comparor::TreeComparor;
pub use flags::CompareFlags;
