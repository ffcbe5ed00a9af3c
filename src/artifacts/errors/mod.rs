//! Error taxonomy
//!
//! Two kinds of failures exist while building and comparing trees:
//!
//! - Source access failures (unreadable file, unlistable directory). These are plain
//!   `anyhow::Error`s and are offered to an [`ErrorHandler`] which decides whether
//!   the work continues.
//! - Usage and configuration errors ([`CompareError`]). They never reach the handler
//!   and abort the operation immediately.

pub mod handler;

pub use handler::{ErrorHandler, ErrorPolicy, ReportingErrorHandler};

use crate::areas::controller::Role;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("no content method is available on both sides to compare '{name}'")]
    NoViableMethod { name: String },
    #[error("path '{path}' does not resolve inside the {role} tree")]
    UnresolvedPath { role: Role, path: String },
    #[error("duplicate entry name '{name}' inside one directory")]
    DuplicateName { name: String },
    #[error("unknown side selector '{0}', expected 'old' or 'new'")]
    UnknownRole(String),
    #[error("the {0} root has not been set")]
    RootNotSet(Role),
}

impl CompareError {
    /// Whether `error` is a usage/configuration error rather than a source access failure
    pub fn is_fatal(error: &anyhow::Error) -> bool {
        error.is::<CompareError>()
    }
}
