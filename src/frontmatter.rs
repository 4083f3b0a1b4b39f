//! YAML front matter: splitting it off a document and converting it to [`Value`]s.

use std::collections::BTreeMap;

use serde_yaml::Value as Yaml;
use thiserror::Error;

use crate::{index::IndexError, value::Value};

const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

/// Key marking documents written by the renderer.
pub const GENERATED_IGNORE: &str = "generated_ignore";

/// YAML content with no [`Value`] equivalent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("unsupported tagged value `{0}`")]
    Tagged(String),

    #[error("unsupported mapping key of kind {0}")]
    Key(&'static str),

    #[error("front matter must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

/// Splits `text` into its front matter and the remaining body.
///
/// Front matter starts with a `---` line and ends at the next `---` line.
/// Without both delimiters the whole text is body.
pub fn split(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, text);
    };
    if first.trim_end() != DELIMITER {
        return (None, text);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return (Some(&text[yaml_start..offset]), &text[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

/// Parses front matter YAML into a metadata map. Empty front matter is an
/// empty map.
pub fn parse(yaml: &str) -> Result<BTreeMap<String, Value>, IndexError> {
    let parsed: Yaml = serde_yaml::from_str(yaml)?;
    match parsed {
        Yaml::Null => Ok(BTreeMap::new()),
        Yaml::Mapping(mapping) => Ok(convert_mapping(mapping)?),
        other => Err(ValueError::NotAMapping(kind(&other)).into()),
    }
}

/// Header for a rendered document: the template's front matter with
/// `generated_ignore: true` in front.
pub fn generated_header(yaml: Option<&str>) -> String {
    let mut header = format!("{}\n{}: true\n", DELIMITER, GENERATED_IGNORE);
    if let Some(yaml) = yaml {
        for line in yaml.split_inclusive('\n') {
            if line.starts_with(GENERATED_IGNORE) && line[GENERATED_IGNORE.len()..].trim_start().starts_with(':') {
                continue;
            }
            header.push_str(line);
            if !line.ends_with('\n') {
                header.push('\n');
            }
        }
    }
    header.push_str(DELIMITER);
    header.push('\n');
    header
}

pub fn to_value(yaml: Yaml) -> Result<Value, ValueError> {
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Boolean(b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Float(u as f64))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Sequence(items) => items
            .into_iter()
            .map(to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(mapping) => convert_mapping(mapping).map(Value::Object),
        Yaml::Tagged(tagged) => Err(ValueError::Tagged(tagged.tag.to_string())),
    }
}

fn convert_mapping(mapping: serde_yaml::Mapping) -> Result<BTreeMap<String, Value>, ValueError> {
    let mut obj = BTreeMap::new();
    for (key, value) in mapping {
        let key = match key {
            Yaml::String(s) => s,
            Yaml::Bool(b) => b.to_string(),
            Yaml::Number(n) => n.to_string(),
            Yaml::Null => "null".to_string(),
            other => return Err(ValueError::Key(kind(&other))),
        };
        obj.insert(key, to_value(value)?);
    }
    Ok(obj)
}

fn kind(yaml: &Yaml) -> &'static str {
    match yaml {
        Yaml::Null => "null",
        Yaml::Bool(_) => "boolean",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_front_matter() {
        let (yaml, body) = split("---\ntitle: A\n---\nbody\n");
        assert_eq!(yaml, Some("title: A\n"));
        assert_eq!(body, "body\n");

        let (yaml, body) = split("\u{feff}---\n---\n");
        assert_eq!(yaml, Some(""));
        assert_eq!(body, "");

        let (yaml, body) = split("no front matter\n---\n");
        assert_eq!(yaml, None);
        assert_eq!(body, "no front matter\n---\n");
    }

    #[test]
    fn nested_metadata() {
        let metadata = parse("cprop:\n  nestedA: 1\n  nestedB: 2\ntags:\n  - tagA\n").unwrap();
        let cprop = metadata["cprop"].as_object().unwrap();
        assert_eq!(cprop["nestedA"], Value::Integer(1));
        assert_eq!(metadata["tags"], Value::Array(vec![Value::from("tagA")]));
    }

    #[test]
    fn tagged_values_are_rejected() {
        assert!(matches!(
            parse("a: !custom 1\n"),
            Err(IndexError::Value(ValueError::Tagged(_)))
        ));
    }

    #[test]
    fn header_replaces_existing_marker() {
        let header = generated_header(Some("generated_ignore: false\ntitle: A"));
        assert_eq!(header, "---\ngenerated_ignore: true\ntitle: A\n---\n");
    }
}
