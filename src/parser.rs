use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, ScaffoldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Format implied by the file extension, if any.
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }
}

pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ScaffoldError::SourceNotFound(path.to_path_buf()),
        _ => ScaffoldError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Decodes the document into an order-preserving JSON tree.
///
/// Without a known format JSON is tried first, then YAML.
pub fn decode(contents: &str, format: Option<SourceFormat>) -> Result<Value> {
    match format {
        Some(SourceFormat::Json) => decode_json(contents),
        Some(SourceFormat::Yaml) => decode_yaml(contents),
        None => decode_json(contents).or_else(|_| decode_yaml(contents)),
    }
}

fn decode_json(contents: &str) -> Result<Value> {
    serde_json::from_str(contents).map_err(|err| ScaffoldError::Syntax(format!("invalid JSON: {err}")))
}

fn decode_yaml(contents: &str) -> Result<Value> {
    serde_yaml::from_str(contents).map_err(|err| ScaffoldError::Syntax(format!("invalid YAML: {err}")))
}

/// Normalizes a validated tree into the compiler's document model.
pub fn parse_document(value: &Value) -> Result<Document> {
    Document::deserialize(value)
        .map_err(|err| ScaffoldError::Parse(format!("cannot read document: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HttpMethod;

    const PETSTORE_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets/{petId}:
    delete:
      responses:
        "204":
          description: deleted
    get:
      responses:
        "200":
          description: ok
  /pets:
    get:
      responses:
        "200":
          description: ok
"#;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(SourceFormat::detect(Path::new("api.YML")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::detect(Path::new("api.json")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::detect(Path::new("api.txt")), None);
        assert_eq!(SourceFormat::detect(Path::new("api")), None);
    }

    #[test]
    fn yaml_keeps_path_and_method_order() {
        let value = decode(PETSTORE_YAML, None).unwrap();
        let doc = parse_document(&value).unwrap();
        assert_eq!(doc.info.title, "Petstore");
        let paths: Vec<_> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/pets/{petId}", "/pets"]);
        let methods: Vec<_> = doc.paths["/pets/{petId}"].operations.keys().copied().collect();
        assert_eq!(methods, vec![HttpMethod::Delete, HttpMethod::Get]);
    }

    #[test]
    fn syntax_errors_are_reported_as_such() {
        let err = decode("{\"openapi\": ", Some(SourceFormat::Json)).unwrap_err();
        assert_eq!(err.category(), "SyntaxError");
        let err = decode("paths: [unclosed", Some(SourceFormat::Yaml)).unwrap_err();
        assert_eq!(err.category(), "SyntaxError");
    }

    #[test]
    fn missing_source_is_not_found() {
        let err = read_source(Path::new("tests/inputs/does-not-exist.yaml")).unwrap_err();
        assert_eq!(err.category(), "SourceNotFound");
    }
}
