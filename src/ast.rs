//! # Dataview Query Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the dataview query
//! language, a small declarative language embedded in Markdown documents and
//! evaluated against the front matter of every document in a site.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, identifiers, operations, calls)
//! - **[operators]** - Binary and unary operators
//! - **[query]** - Full clause structure (view type, select list, FROM, WHERE)
//!
//! ## Quick Start
//!
//! ```text
//! TABLE file.link, metadata.status AS "Status" FROM #project WHERE metadata.priority > 2
//! ```
//!
//! This query renders a two-column table with one row per document tagged
//! `project` whose `priority` is above 2.
//!
//! ## Core Concepts
//!
//! ### Views
//!
//! - **TABLE** - header row, separator, then one row per matching document
//! - **LIST** - one bullet per matching document
//!
//! ### Identifiers
//!
//! Identifiers are dotted paths into the per-document resolution context:
//!
//! - `metadata.*` - front matter of the document being iterated
//! - `file.*` - `path`, `name` and `link` of the document being iterated
//! - `this.*` - record of the document containing the query
//!
//! A path that does not exist resolves to the empty string, while a key that
//! exists with a `null` value resolves to `null`.
//!
//! Backticks quote an identifier so that keywords can be used as names:
//! `` `metadata.in` ``. Dots inside backticks still separate segments.
//!
//! ## Examples
//!
//! ### List of tagged pages
//!
//! ```text
//! LIST FROM #howto
//! ```
//!
//! ### Membership
//!
//! ```text
//! TABLE file.link WHERE this.metadata.featureID IN metadata.tags
//! ```
//!
//! ### Inline expression
//!
//! ```text
//! Total: `= sum(this.metadata.a, this.metadata.b)`
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod query;

pub use tokens::{Span, Spanned, Token};
pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use query::{FromExpr, FullClause, SelectClause, SelectItem};
