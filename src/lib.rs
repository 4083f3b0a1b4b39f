pub mod ast;
pub mod cli;
pub mod context;
pub mod evaluator;
pub mod frontmatter;
pub mod functions;
pub mod grammar;
pub mod index;
pub mod interpret;
pub mod lexer;
pub mod markdown;
pub mod parser;
pub mod query;
pub mod render;
pub mod site;
pub mod value;

pub use ast::{BinOp, Expr, FromExpr, FullClause, SelectClause, SelectItem, Token, UnaryOp};
pub use context::{Context, Lookup};
pub use evaluator::{EvalError, Evaluator};
pub use functions::Builtin;
pub use grammar::StartSymbol;
pub use index::{Document, DocumentIndex, FileInfo, IndexError, Metadata};
pub use interpret::Source;
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parsed, Parser, SyntaxError};
pub use query::{ExpressionService, QueryError, QueryService};
pub use render::{RenderError, Renderer, View};
pub use site::{Site, SiteError};
pub use value::Value;
