use log::{debug, trace};
use thiserror::Error;

use crate::{
    context::Context,
    evaluator::{EvalError, Evaluator},
    index::{Document, DocumentIndex},
    interpret::Source,
    parser::SyntaxError,
    query::{ExpressionService, QueryError, QueryService},
    value::Value,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("error parsing query `{query}`: {source}")]
    Query { query: String, source: SyntaxError },

    #[error("error in FROM clause: {0}")]
    Sources(#[source] QueryError),

    #[error("error executing WHERE clause for {path}: {source}")]
    Where { path: String, source: EvalError },

    #[error("error rendering columns for {path}: {source}")]
    Columns { path: String, source: EvalError },

    #[error("error executing expression `{expression}`: {source}")]
    Expression { expression: String, source: EvalError },

    #[error("unknown view type `{0}` (expected TABLE or LIST)")]
    UnknownViewType(String),

    #[error("TABLE query needs at least one column")]
    EmptyTable,

    #[error("dataview fence opened on line {line} is never closed")]
    UnterminatedFence { line: usize },
}

/// How matching documents are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    List,
}

impl View {
    pub fn from_keyword(keyword: &str) -> Option<View> {
        if keyword.eq_ignore_ascii_case("TABLE") {
            Some(View::Table)
        } else if keyword.eq_ignore_ascii_case("LIST") {
            Some(View::List)
        } else {
            None
        }
    }
}

/// Renders queries against a [`DocumentIndex`].
///
/// # Examples
///
/// ```
/// use dataview::{DocumentIndex, FileInfo, Renderer, Value};
///
/// let mut index = DocumentIndex::new();
/// let metadata = [("tags".to_string(), Value::Array(vec![Value::from("x")]))].into();
/// index.insert_document("a.md", metadata, FileInfo::new("a.md", "a.md")).unwrap();
///
/// let renderer = Renderer::new(&index);
/// let out = renderer.render_query("TABLE file.name FROM #x", &Value::Null, "index.md").unwrap();
/// assert_eq!(out, "|file.name|\n|--|\n|a.md|\n");
/// ```
pub struct Renderer<'a> {
    index: &'a DocumentIndex,
    evaluator: Evaluator,
}

impl<'a> Renderer<'a> {
    pub fn new(index: &'a DocumentIndex) -> Self {
        Renderer {
            index,
            evaluator: Evaluator::new(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn index(&self) -> &DocumentIndex {
        self.index
    }

    /// Renders one query for the page published at `out_path`.
    ///
    /// `this` is the record of the page containing the query.
    pub fn render_query(&self, query: &str, this: &Value, out_path: &str) -> Result<String, RenderError> {
        debug!("rendering query for {}: {}", out_path, query.trim());

        let service = QueryService::new(query)
            .map_err(|source| RenderError::Query {
                query: query.to_string(),
                source,
            })?
            .with_evaluator(self.evaluator.clone());

        let view = View::from_keyword(service.render_type())
            .ok_or_else(|| RenderError::UnknownViewType(service.render_type().to_string()))?;
        let sources = service.sources().map_err(RenderError::Sources)?;

        let mut out = String::new();
        if view == View::Table {
            if service.clause().select.is_empty() {
                return Err(RenderError::EmptyTable);
            }
            write_table_header(&service.columns(), &mut out);
        }

        for document in self.index.iter() {
            if !sources.iter().all(|source| source_matches(source, document)) {
                trace!("skip {} due to FROM clause", document.file.path);
                continue;
            }

            let context = self.document_context(document, this, out_path);

            let matched = service
                .where_matches(&context)
                .map_err(|source| RenderError::Where {
                    path: document.file.path.clone(),
                    source,
                })?;
            trace!(
                "check {} against `{}`: {}",
                document.file.path,
                service.where_expression(),
                matched
            );
            if !matched {
                continue;
            }

            let row = service
                .render_columns(&context)
                .map_err(|source| RenderError::Columns {
                    path: document.file.path.clone(),
                    source,
                })?;

            match view {
                View::Table => write_table_row(&row, &mut out),
                View::List if row.is_empty() => {
                    out.push_str("- ");
                    out.push_str(&file_link(document, out_path));
                    out.push('\n');
                }
                View::List => {
                    let cells: Vec<String> = row.iter().map(Value::to_cell).collect();
                    out.push_str("- ");
                    out.push_str(&cells.join(", "));
                    out.push('\n');
                }
            }
        }

        Ok(out)
    }

    /// Solves an inline `= expr` marker against `this` only.
    ///
    /// Returns `Ok(None)` when the text does not parse, so the caller can
    /// leave it untouched.
    pub fn render_inline(&self, expression: &str, this: &Value) -> Result<Option<String>, RenderError> {
        let service = match ExpressionService::new(expression) {
            Ok(service) => service.with_evaluator(self.evaluator.clone()),
            Err(e) => {
                trace!("inline text `{}` is not an expression: {}", expression, e);
                return Ok(None);
            }
        };

        let context = Context::new().with("this", this.clone());
        let value = service.solve(&context).map_err(|source| RenderError::Expression {
            expression: expression.to_string(),
            source,
        })?;
        Ok(Some(value.to_cell()))
    }

    /// Resolution context for one iterated document:
    /// `this`, `metadata` and `file` (with the computed `link`).
    pub fn document_context(&self, document: &Document, this: &Value, out_path: &str) -> Context {
        let mut file = document.file.to_value();
        if let Value::Object(obj) = &mut file {
            obj.insert("link".to_string(), Value::String(file_link(document, out_path)));
        }

        Context::new()
            .with("this", this.clone())
            .with("metadata", Value::Object(document.metadata.clone()))
            .with("file", file)
    }
}

fn source_matches(source: &Source, document: &Document) -> bool {
    match source {
        Source::Tag(tag) => document.has_tag(tag),
        Source::Path(prefix) => document.file.path.starts_with(prefix.as_str()),
    }
}

fn write_table_header(columns: &[String], out: &mut String) {
    out.push('|');
    out.push_str(&columns.join("|"));
    out.push_str("|\n|");
    out.push_str(&"--|".repeat(columns.len()));
    out.push('\n');
}

fn write_table_row(row: &[Value], out: &mut String) {
    let cells: Vec<String> = row.iter().map(Value::to_cell).collect();
    out.push('|');
    out.push_str(&cells.join("|"));
    out.push_str("|\n");
}

/// `[title](relative path)`, title falling back to the file's base name.
pub fn file_link(document: &Document, out_path: &str) -> String {
    let title = match document.metadata.get("title") {
        Some(title) => title.to_cell(),
        None => basename(&document.file.path).to_string(),
    };
    let target = relative_path(&document.file.path, dirname(out_path));
    format!("[{}]({})", title, target)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}

/// `/`-separated path to `target` as seen from directory `base`.
pub fn relative_path(target: &str, base: &str) -> String {
    let components = |p: &str| -> Vec<String> {
        p.split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_string)
            .collect()
    };
    let target = components(target);
    let base = components(base);

    let common = target.iter().zip(&base).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<&str> = vec![".."; base.len() - common];
    parts.extend(target[common..].iter().map(String::as_str));

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[test]
fn test_relative_path() {
    assert_eq!(relative_path("a/b/c.md", "a/b"), "c.md");
    assert_eq!(relative_path("a/c.md", "a/b"), "../c.md");
    assert_eq!(relative_path("x/y.md", ""), "x/y.md");
    assert_eq!(relative_path("a", "a"), ".");
}

#[test]
fn test_dirname_and_basename() {
    assert_eq!(dirname("docs/page.md"), "docs");
    assert_eq!(dirname("page.md"), "");
    assert_eq!(basename("docs/page.md"), "page.md");
}

#[test]
fn test_view_keywords() {
    assert_eq!(View::from_keyword("TABLE"), Some(View::Table));
    assert_eq!(View::from_keyword("list"), Some(View::List));
    assert_eq!(View::from_keyword("CALENDAR"), None);
}
