//! YAML / JSON file source.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::{ConfigSource, Pairs, SourceError};
use crate::secrets;

/// Reads pairs from a YAML or JSON document.
///
/// Nested mappings flatten to dotted keys:
///
/// ```yaml
/// credentials:
///   maps_key: $ENV{MAPS_KEY}
/// ```
///
/// becomes `credentials.maps_key`. Files ending in `.json` are parsed as
/// JSON, everything else as YAML. Literal values in secret fields are
/// reported with a warning since the file may be version-controlled.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("file:{}", path.display()),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        let pairs = if self.is_json() {
            let doc: Value = serde_json::from_str(&content)?;
            flatten_document(&doc)?
        } else {
            parse_yaml(&content)?
        };
        secrets::warn_plaintext_secrets(&self.name, &pairs);
        Ok(pairs)
    }
}

/// Parses a YAML document into flattened pairs.
pub(crate) fn parse_yaml(content: &str) -> Result<Pairs, SourceError> {
    let doc: Value = serde_yaml::from_str(content)?;
    flatten_document(&doc)
}

fn flatten_document(doc: &Value) -> Result<Pairs, SourceError> {
    let mut pairs = Pairs::new();
    match doc {
        // Empty document
        Value::Null => {}
        Value::Mapping(_) => flatten_into(doc, "", &mut pairs)?,
        _ => {
            return Err(SourceError::Format {
                key: "<root>".to_string(),
                reason: "document root must be a mapping".to_string(),
            });
        }
    }
    Ok(pairs)
}

fn flatten_into(value: &Value, path: &str, pairs: &mut Pairs) -> Result<(), SourceError> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(b) => {
            pairs.insert(path.to_string(), b.to_string());
            Ok(())
        }
        Value::Number(n) => {
            pairs.insert(path.to_string(), n.to_string());
            Ok(())
        }
        Value::String(s) => {
            pairs.insert(path.to_string(), s.clone());
            Ok(())
        }
        Value::Mapping(map) => {
            for (k, v) in map {
                let key = scalar_key(k, path)?;
                let child = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(v, &child, pairs)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => flatten_into(&tagged.value, path, pairs),
        Value::Sequence(_) => Err(SourceError::Format {
            key: path.to_string(),
            reason: "sequences are not supported".to_string(),
        }),
    }
}

fn scalar_key(key: &Value, parent: &str) -> Result<String, SourceError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(SourceError::Format {
            key: parent.to_string(),
            reason: "mapping keys must be scalars".to_string(),
        }),
    }
}
