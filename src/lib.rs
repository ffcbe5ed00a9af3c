//! Tree comparison and alignment engine
//!
//! Compares two file trees (filesystem, archive or snapshot shaped) and produces a
//! merged result tree telling, for every entry, on which side it exists and whether
//! both copies have the same content.
//!
//! - `artifacts`: node model, content equality, tree comparison and alignment
//! - `areas`: tree builders and the compare controller state machine
//! - `commands`: user-facing command implementations behind the `treecmp` binary

pub mod areas;
pub mod artifacts;
pub mod commands;
