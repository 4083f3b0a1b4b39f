use thiserror::Error;

use crate::{
    ast::{Expr, FullClause},
    context::Context,
    evaluator::{EvalError, Evaluator},
    interpret::{self, Source},
    lexer::Lexer,
    parser::{Parser, SyntaxError},
    value::Value,
};

/// Errors surfaced by [`QueryService`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    /// `FROM` combinator that cannot be expressed as a conjunction
    #[error("{0} is not supported in FROM clauses")]
    UnsupportedSource(String),
}

/// A parsed query, ready to be evaluated against any number of documents.
///
/// Parsing happens once in [`QueryService::new`]; every other method is a
/// read-only walk over the tree, so a service can be shared across threads.
///
/// # Examples
///
/// ```
/// use dataview::{Context, QueryService, Value};
///
/// let service = QueryService::new(r#"TABLE metadata.a AS "A", metadata.a + 1 WHERE metadata.a > 1"#).unwrap();
/// assert_eq!(service.render_type(), "TABLE");
/// assert_eq!(service.columns(), vec!["A", "metadata.a + 1"]);
///
/// let context = Context::new().with("metadata", Value::Object([("a".to_string(), Value::Integer(2))].into()));
/// assert!(service.where_matches(&context).unwrap());
/// assert_eq!(service.render_columns(&context).unwrap(), vec![Value::Integer(2), Value::Integer(3)]);
/// ```
#[derive(Debug, Clone)]
pub struct QueryService {
    clause: FullClause,
    evaluator: Evaluator,
}

impl QueryService {
    pub fn new(query: &str) -> Result<Self, SyntaxError> {
        let clause = Parser::new(Lexer::new(query))?.parse_full_clause()?;
        Ok(QueryService {
            clause,
            evaluator: Evaluator::new(),
        })
    }

    /// Replaces the evaluator, e.g. one with extra functions registered.
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn clause(&self) -> &FullClause {
        &self.clause
    }

    /// View keyword as written (`TABLE`, `LIST`, ...).
    pub fn render_type(&self) -> &str {
        interpret::view_type(&self.clause)
    }

    pub fn sources(&self) -> Result<Vec<Source>, QueryError> {
        interpret::sources(&self.clause)
    }

    pub fn columns(&self) -> Vec<String> {
        interpret::column_names(&self.clause.select)
    }

    /// Whether the document described by `context` passes the `WHERE` clause.
    ///
    /// A query without `WHERE` matches everything.
    pub fn where_matches(&self, context: &Context) -> Result<bool, EvalError> {
        match &self.clause.condition {
            Some(condition) => Ok(self.evaluator.solve(condition, context)?.is_truthy()),
            None => Ok(true),
        }
    }

    pub fn render_columns(&self, context: &Context) -> Result<Vec<Value>, EvalError> {
        self.evaluator.solve_select(&self.clause.select, context)
    }

    /// Text of the `WHERE` condition for diagnostics, empty when absent.
    pub fn where_expression(&self) -> String {
        self.clause
            .condition
            .as_ref()
            .map(Expr::to_string)
            .unwrap_or_default()
    }
}

/// A single parsed expression, as used by inline `` `= expr` `` markers.
#[derive(Debug, Clone)]
pub struct ExpressionService {
    expr: Expr,
    evaluator: Evaluator,
}

impl ExpressionService {
    pub fn new(expression: &str) -> Result<Self, SyntaxError> {
        let expr = Parser::new(Lexer::new(expression))?.parse()?;
        Ok(ExpressionService {
            expr,
            evaluator: Evaluator::new(),
        })
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn expression(&self) -> &Expr {
        &self.expr
    }

    pub fn solve(&self, context: &Context) -> Result<Value, EvalError> {
        self.evaluator.solve(&self.expr, context)
    }
}
