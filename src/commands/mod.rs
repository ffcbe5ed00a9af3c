//! Command implementations behind the `treecmp` binary
//!
//! - `compare`: compare two trees and report every differing entry
//! - `align`: show how two trees would be aligned before comparing them
//!
//! Both are implemented on [`Session`](crate::areas::session::Session) and write
//! their report to the session's writer.

pub mod align;
pub mod compare;
