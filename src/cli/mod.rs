//! CLI support for dataview
//!
//! Each subcommand of the `dataview` binary is a plain function here, so the
//! same operations can be driven from other tools or from tests.

mod check;
mod convert;
mod eval;
mod render;

pub use check::{CheckReport, execute_check};
pub use convert::{json_to_value, value_to_json};
pub use eval::{EvalOptions, execute_eval};
pub use render::{QueryOptions, execute_query, execute_render};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Syntax(#[from] crate::SyntaxError),

    #[error("Query error: {0}")]
    Query(#[from] crate::QueryError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Render error: {0}")]
    Render(#[from] crate::RenderError),

    #[error(transparent)]
    Site(#[from] crate::SiteError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `--input` was not a JSON object of root names
    #[error("Context must be a JSON object, got {0}")]
    InvalidContext(&'static str),

    #[error("No document `{0}` in the docs directory")]
    PageNotFound(String),
}
