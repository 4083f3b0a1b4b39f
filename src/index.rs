use std::{
    collections::{BTreeMap, HashMap},
    io,
};

use thiserror::Error;

use crate::{
    frontmatter::{self, GENERATED_IGNORE, ValueError},
    value::Value,
};

/// Front matter of one document.
pub type Metadata = BTreeMap<String, Value>;

/// Key reserved for the computed `file` record.
pub const RESERVED_FILE_KEY: &str = "file";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("front matter of {0} defines the reserved key `file`")]
    ReservedKey(String),

    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The `file` record of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// Path the document is published at, `/`-separated
    pub path: String,
    /// File name of the source document
    pub name: String,
}

impl FileInfo {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        FileInfo {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = BTreeMap::new();
        obj.insert("path".to_string(), Value::String(self.path.clone()));
        obj.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(obj)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub metadata: Metadata,
    pub file: FileInfo,
}

impl Document {
    /// `{metadata, file}`, the shape bound to `this`.
    pub fn record(&self) -> Value {
        let mut obj = BTreeMap::new();
        obj.insert("metadata".to_string(), Value::Object(self.metadata.clone()));
        obj.insert(RESERVED_FILE_KEY.to_string(), self.file.to_value());
        Value::Object(obj)
    }

    /// Entries of `metadata.tags`; a single string counts as one tag.
    pub fn tags(&self) -> Vec<String> {
        match self.metadata.get("tags") {
            Some(Value::Array(items)) => items.iter().map(Value::to_cell).collect(),
            Some(Value::String(tag)) => vec![tag.clone()],
            _ => vec![],
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

/// In-memory index of every document's front matter.
///
/// Iteration follows insertion order; re-inserting a key replaces the
/// document in place.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
    tags: BTreeMap<String, Vec<String>>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document. Returns `Ok(false)` when the document is marked
    /// `generated_ignore` and was left out.
    pub fn insert_document(&mut self, key: impl Into<String>, metadata: Metadata, file: FileInfo) -> Result<bool, IndexError> {
        let key = key.into();

        if metadata.get(GENERATED_IGNORE).is_some_and(Value::is_truthy) {
            log::debug!("skipping generated document {}", key);
            return Ok(false);
        }
        if metadata.contains_key(RESERVED_FILE_KEY) {
            return Err(IndexError::ReservedKey(key));
        }

        let document = Document {
            key: key.clone(),
            metadata,
            file,
        };

        match self.positions.get(&key).copied() {
            Some(position) => {
                for keys in self.tags.values_mut() {
                    keys.retain(|k| k != &key);
                }
                self.tags.retain(|_, keys| !keys.is_empty());
                for tag in document.tags() {
                    self.tags.entry(tag).or_default().push(key.clone());
                }
                self.documents[position] = document;
            }
            None => {
                for tag in document.tags() {
                    self.tags.entry(tag).or_default().push(key.clone());
                }
                self.positions.insert(key, self.documents.len());
                self.documents.push(document);
            }
        }
        Ok(true)
    }

    /// Parses the front matter of `text` and adds the document.
    pub fn insert_source(&mut self, key: impl Into<String>, text: &str, file: FileInfo) -> Result<bool, IndexError> {
        let metadata = match frontmatter::split(text).0 {
            Some(yaml) => frontmatter::parse(yaml)?,
            None => Metadata::new(),
        };
        self.insert_document(key, metadata, file)
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.positions.get(key).map(|&i| &self.documents[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn documents_with_tag(&self, tag: &str) -> impl Iterator<Item = &Document> {
        self.tags
            .get(tag)
            .into_iter()
            .flatten()
            .filter_map(|key| self.get(key))
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
