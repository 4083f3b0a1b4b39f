//! Render templates of a docs directory, or a single query against it

use std::path::{Path, PathBuf};

use crate::{Renderer, Site, Value};
use super::CliError;

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub query: String,
    pub docs_dir: PathBuf,
    /// Docs-relative path of the page the query is rendered for (`this`)
    pub page: Option<String>,
}

/// Render every template under `docs_dir`, returning the written files
pub fn execute_render(docs_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let site = Site::collect(docs_dir)?;
    Ok(site.render_templates()?)
}

/// Render one query against the documents under `options.docs_dir`
pub fn execute_query(options: &QueryOptions) -> Result<String, CliError> {
    let site = Site::collect(&options.docs_dir)?;
    let renderer = Renderer::new(site.index());

    let (this, out_path) = match &options.page {
        Some(page) => {
            let document = site
                .index()
                .get(page)
                .ok_or_else(|| CliError::PageNotFound(page.clone()))?;
            (document.record(), document.file.path.clone())
        }
        None => (Value::Null, String::new()),
    };

    Ok(renderer.render_query(&options.query, &this, &out_path)?)
}
