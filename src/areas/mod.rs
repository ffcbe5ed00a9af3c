//! Stateful components around the comparison engine
//!
//! - `builder`: the tree builder capability
//! - `workspace`: trees read from the filesystem
//! - `memory`: in-memory trees and content sources (archive and snapshot stand-ins)
//! - `filter`: name based exclusion over another builder
//! - `listeners`: root change notification
//! - `controller`: old/new roots, alignment and the published comparison
//! - `session`: controller, error handler and output writer behind the commands

pub mod builder;
pub mod controller;
pub mod filter;
pub mod listeners;
pub mod memory;
pub mod session;
pub mod workspace;
