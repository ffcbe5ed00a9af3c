//! Tree comparison data structures and algorithms
//!
//! - `nodes`: directory/file nodes and comparison result nodes
//! - `content`: per-file content proofs (checksum, digest, text probing) and the
//!   method selection that decides if two files are identical
//! - `compare`: the pairwise tree walk producing comparison result trees
//! - `align`: name/depth based alignment of misrooted trees
//! - `errors`: error taxonomy and the pluggable error handler

pub mod align;
pub mod compare;
pub mod content;
pub mod errors;
pub mod nodes;
