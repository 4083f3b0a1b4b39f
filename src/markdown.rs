//! Finds dataview fences and inline expressions in Markdown bodies.
//!
//! ````text
//! ```dataview
//! TABLE file.link FROM #howto
//! ```
//! ````
//!
//! A fenced block is replaced by the rendered table or list. Inline code
//! spans of the form `` `= this.metadata.status` `` are replaced by the
//! solved value.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    render::{RenderError, Renderer},
    value::Value,
};

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```dataview[ \t]*\r?\n?$").expect("fence pattern is valid"));

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").expect("code span pattern is valid"));

static INLINE_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^`= (.*)`$").expect("inline expression pattern is valid"));

/// Renders every fence and inline expression in `body`.
///
/// `this` is the record of the document being rendered and `out_path` the
/// path it is published at.
pub fn render_document(renderer: &Renderer<'_>, body: &str, this: &Value, out_path: &str) -> Result<String, RenderError> {
    let mut out = String::with_capacity(body.len());
    let mut query: Option<(usize, String)> = None;

    for (number, line) in body.split_inclusive('\n').enumerate() {
        match &mut query {
            None if FENCE_OPEN.is_match(line) => query = Some((number + 1, String::new())),
            None => out.push_str(&render_line(renderer, line, this)?),
            Some((_, text)) if line.trim_end() == "```" => {
                let rendered = renderer.render_query(text, this, out_path)?;
                out.push_str(&rendered);
                query = None;
            }
            Some((_, text)) => text.push_str(line),
        }
    }

    if let Some((line, _)) = query {
        return Err(RenderError::UnterminatedFence { line });
    }
    Ok(out)
}

/// Replaces inline `` `= expr` `` spans in one line.
pub fn render_line(renderer: &Renderer<'_>, line: &str, this: &Value) -> Result<String, RenderError> {
    let mut out = String::with_capacity(line.len());
    for part in split_inline(line) {
        match INLINE_EXPR.captures(part) {
            Some(caps) => {
                let expression = caps.get(1).map_or("", |m| m.as_str());
                match renderer.render_inline(expression, this)? {
                    Some(rendered) => out.push_str(&rendered),
                    None => out.push_str(part),
                }
            }
            None => out.push_str(part),
        }
    }
    Ok(out)
}

/// Splits a line into plain text and backtick-delimited parts.
///
/// An unmatched backtick is plain text. Empty text parts are dropped.
pub fn split_inline(line: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut last = 0;
    for span in CODE_SPAN.find_iter(line) {
        if span.start() > last {
            parts.push(&line[last..span.start()]);
        }
        parts.push(span.as_str());
        last = span.end();
    }
    if last < line.len() {
        parts.push(&line[last..]);
    }
    parts
}
