use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ignore::WalkBuilder;
use log::{debug, info};
use thiserror::Error;

use crate::{
    frontmatter,
    index::{Document, DocumentIndex, FileInfo, IndexError, Metadata},
    markdown,
    render::{RenderError, Renderer},
    value::Value,
};

pub const MARKDOWN_EXT: &str = "md";
pub const TEMPLATE_EXT: &str = "mdtmpl";

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to index {}: {source}", path.display())]
    Index { path: PathBuf, source: IndexError },

    #[error("failed to render {}: {source}", path.display())]
    Render { path: PathBuf, source: RenderError },

    #[error("failed to walk docs directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// A template found while collecting, rendered to its `.md` sibling.
#[derive(Debug, Clone)]
pub struct Template {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Index key, i.e. the source path relative to the docs root
    pub key: String,
    pub file: FileInfo,
}

/// A docs directory: every Markdown document indexed, templates remembered.
#[derive(Debug)]
pub struct Site {
    root: PathBuf,
    index: DocumentIndex,
    templates: Vec<Template>,
}

impl Site {
    /// Walks `root` and indexes every `.md` and `.mdtmpl` file.
    ///
    /// Files are visited in file-name order so the index, and therefore row
    /// order in rendered tables, is stable across runs.
    pub fn collect(root: impl AsRef<Path>) -> Result<Self, SiteError> {
        let root = root.as_ref().to_path_buf();
        let mut index = DocumentIndex::new();
        let mut templates = vec![];

        // Every document counts, including hidden and ignore-listed ones
        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let is_template = match path.extension().and_then(|e| e.to_str()) {
                Some(MARKDOWN_EXT) => false,
                Some(TEMPLATE_EXT) => true,
                _ => continue,
            };

            let key = relative_key(&root, path);
            let published = if is_template {
                with_extension(&key, MARKDOWN_EXT)
            } else {
                key.clone()
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file = FileInfo::new(published, name);

            let text = fs::read_to_string(path).map_err(|source| SiteError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            let indexed = index
                .insert_source(key.clone(), &text, file.clone())
                .map_err(|source| SiteError::Index {
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!("collected {} (indexed: {})", key, indexed);

            if is_template {
                templates.push(Template {
                    source: path.to_path_buf(),
                    target: path.with_extension(MARKDOWN_EXT),
                    key,
                    file,
                });
            }
        }

        info!(
            "indexed {} documents and {} templates under {}",
            index.len(),
            templates.len(),
            root.display()
        );

        Ok(Site { root, index, templates })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Record bound to `this` for the document at `key`.
    ///
    /// Documents left out of the index (`generated_ignore`) get an empty
    /// metadata record.
    pub fn this_record(&self, key: &str, file: &FileInfo) -> Value {
        match self.index.get(key) {
            Some(document) => document.record(),
            None => Document {
                key: key.to_string(),
                metadata: Metadata::new(),
                file: file.clone(),
            }
            .record(),
        }
    }

    /// Renders one template to the text of its `.md` output.
    pub fn render_template(&self, template: &Template) -> Result<String, SiteError> {
        let text = fs::read_to_string(&template.source).map_err(|source| SiteError::Io {
            path: template.source.clone(),
            source,
        })?;
        let (yaml, body) = frontmatter::split(&text);

        let this = self.this_record(&template.key, &template.file);
        let renderer = Renderer::new(&self.index);
        let rendered =
            markdown::render_document(&renderer, body, &this, &template.file.path).map_err(|source| {
                SiteError::Render {
                    path: template.source.clone(),
                    source,
                }
            })?;

        let mut out = frontmatter::generated_header(yaml);
        out.push_str(&rendered);
        Ok(out)
    }

    /// Writes every `x.mdtmpl` to `x.md`. Returns the written paths.
    pub fn render_templates(&self) -> Result<Vec<PathBuf>, SiteError> {
        let mut written = vec![];
        for template in &self.templates {
            let out = self.render_template(template)?;
            fs::write(&template.target, out).map_err(|source| SiteError::Io {
                path: template.target.clone(),
                source,
            })?;
            info!("rendered {}", template.target.display());
            written.push(template.target.clone());
        }
        Ok(written)
    }
}

/// `/`-separated path of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn with_extension(key: &str, ext: &str) -> String {
    match key.rsplit_once('.') {
        Some((stem, old)) if !stem.is_empty() && !stem.ends_with('/') && !old.contains('/') => {
            format!("{}.{}", stem, ext)
        }
        _ => format!("{}.{}", key, ext),
    }
}

#[test]
fn test_template_key_extension() {
    assert_eq!(with_extension("guides/intro.mdtmpl", "md"), "guides/intro.md");
    assert_eq!(with_extension("a.b/c.mdtmpl", "md"), "a.b/c.md");
}

#[test]
fn test_relative_key() {
    let root = Path::new("/docs");
    assert_eq!(relative_key(root, Path::new("/docs/a/b.md")), "a/b.md");
}
