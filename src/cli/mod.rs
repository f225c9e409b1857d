//! CLI support for axis-query
//!
//! Provides programmatic access to the `axq` commands so they can be
//! embedded in other tools and tested without spawning a process.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_canonical, execute_check, operations_listing};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid data: {0}")]
    Store(#[from] crate::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No data provided. Use --store or pipe a JSON store to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'axq docs' to see available categories.")]
    UnknownCategory(String),
}
