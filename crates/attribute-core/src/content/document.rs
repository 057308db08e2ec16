//! Loading and saving content files (JSON, YAML, and TOML).

use serde_json::{Number, Value};
use std::path::{Path, PathBuf};

use crate::error::ContentError;

use super::node::{ContentNode, Record};

/// Serialization format of a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ContentError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    extension
                },
            }),
        }
    }
}

/// A content file and its parsed tree.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub root: ContentNode,
}

impl ContentDocument {
    /// Read and parse a content file.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let format = DocumentFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, format, &text)
    }

    /// Parse content text in the given format; `path` labels errors.
    pub fn parse(path: &Path, format: DocumentFormat, text: &str) -> Result<Self, ContentError> {
        let parse_error = |message: String| ContentError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let root: ContentNode = match format {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?
            }
            DocumentFormat::Toml => {
                let table: toml::Table =
                    toml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
                from_toml(toml::Value::Table(table)).map_err(parse_error)?
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            format,
            root,
        })
    }

    /// Serialize the (possibly patched) tree back to its format.
    pub fn to_string_pretty(&self) -> Result<String, ContentError> {
        let serialize_error = |message: String| ContentError::Serialize {
            path: self.path.clone(),
            message,
        };
        match self.format {
            DocumentFormat::Json => serde_json::to_string_pretty(&self.root)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| serialize_error(e.to_string())),
            DocumentFormat::Yaml => {
                serde_yaml::to_string(&self.root).map_err(|e| serialize_error(e.to_string()))
            }
            DocumentFormat::Toml => {
                let value = to_toml(&self.root).map_err(serialize_error)?;
                toml::to_string_pretty(&value).map_err(|e| serialize_error(e.to_string()))
            }
        }
    }

    /// Write the document back to its own path.
    pub fn save(&self) -> Result<(), ContentError> {
        let text = self.to_string_pretty()?;
        std::fs::write(&self.path, text).map_err(|source| ContentError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn from_toml(value: toml::Value) -> Result<ContentNode, String> {
    Ok(match value {
        toml::Value::String(s) => ContentNode::Scalar(Value::String(s)),
        toml::Value::Integer(i) => ContentNode::Scalar(Value::Number(i.into())),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(|n| ContentNode::Scalar(Value::Number(n)))
            .ok_or_else(|| format!("float {f} has no JSON representation"))?,
        toml::Value::Boolean(b) => ContentNode::Scalar(Value::Bool(b)),
        toml::Value::Datetime(datetime) => ContentNode::Datetime(datetime),
        toml::Value::Array(items) => ContentNode::List(
            items
                .into_iter()
                .map(from_toml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(table) => ContentNode::Record(
            table
                .into_iter()
                .map(|(key, value)| from_toml(value).map(|node| (key, node)))
                .collect::<Result<Record, _>>()?,
        ),
    })
}

fn to_toml(node: &ContentNode) -> Result<toml::Value, String> {
    Ok(match node {
        ContentNode::Scalar(Value::Null) => return Err("TOML has no null value".to_string()),
        ContentNode::Scalar(Value::Bool(b)) => toml::Value::Boolean(*b),
        ContentNode::Scalar(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => toml::Value::Integer(i),
            (None, Some(f)) if !n.is_u64() => toml::Value::Float(f),
            _ => return Err(format!("number {n} does not fit a TOML integer")),
        },
        ContentNode::Scalar(Value::String(s)) => toml::Value::String(s.clone()),
        ContentNode::Scalar(other) => return Err(format!("unexpected scalar {other}")),
        ContentNode::Datetime(datetime) => toml::Value::Datetime(*datetime),
        ContentNode::List(items) => {
            toml::Value::Array(items.iter().map(to_toml).collect::<Result<_, _>>()?)
        }
        ContentNode::Record(record) => toml::Value::Table(
            record
                .iter()
                .map(|(key, node)| to_toml(node).map(|value| (key.clone(), value)))
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("home.json")).unwrap(),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("HOME.TOML")).unwrap(),
            DocumentFormat::Toml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("home.yml")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("home.yaml")).unwrap(),
            DocumentFormat::Yaml
        );
        let err = DocumentFormat::from_path(Path::new("home.md")).unwrap_err();
        assert!(matches!(err, ContentError::UnsupportedFormat { .. }));
        assert!(DocumentFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_parse_json() {
        let doc = ContentDocument::parse(
            Path::new("home.json"),
            DocumentFormat::Json,
            r#"{ "hero": { "src": "/img/a.png" } }"#,
        )
        .unwrap();
        assert_eq!(doc.root.image_refs().len(), 1);
    }

    #[test]
    fn test_parse_toml() {
        let text = "title = \"Gallery\"\n\n[[items]]\nsrc = \"/img/a.png\"\n\n[[items]]\nsrc = \"/img/b.png\"\n";
        let doc = ContentDocument::parse(Path::new("gallery.toml"), DocumentFormat::Toml, text)
            .unwrap();
        let srcs: Vec<String> = doc.root.image_refs().into_iter().map(|r| r.src).collect();
        assert_eq!(srcs, vec!["/img/a.png", "/img/b.png"]);
    }

    #[test]
    fn test_parse_yaml() {
        let text = "title: Home\nhero:\n  src: /img/a.png\n  alt: Hero\ngallery:\n  - src: /img/b.png\n";
        let doc = ContentDocument::parse(Path::new("home.yml"), DocumentFormat::Yaml, text)
            .unwrap();
        let srcs: Vec<String> = doc.root.image_refs().into_iter().map(|r| r.src).collect();
        assert_eq!(srcs, vec!["/img/b.png", "/img/a.png"]);
    }

    #[test]
    fn test_yaml_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.yml");
        std::fs::write(&path, "hero:\n  src: /img/a.png\ncount: 3\n").unwrap();

        let doc = ContentDocument::load(&path).unwrap();
        doc.save().unwrap();
        let reloaded = ContentDocument::load(&path).unwrap();
        assert_eq!(reloaded.root, doc.root);
        assert_eq!(
            reloaded.root.pointer("/hero/src").and_then(ContentNode::as_str),
            Some("/img/a.png")
        );
    }

    #[test]
    fn test_toml_dates_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.toml");
        std::fs::write(
            &path,
            "date = 2024-05-01\npublished = 2024-05-01T09:30:00Z\n\n[cover]\nsrc = \"/img/a.png\"\n",
        )
        .unwrap();

        let doc = ContentDocument::load(&path).unwrap();
        assert!(matches!(doc.root.get("date"), Some(ContentNode::Datetime(_))));
        let text = doc.to_string_pretty().unwrap();
        assert!(text.contains("date = 2024-05-01\n"), "{text}");
        assert!(text.contains("published = 2024-05-01T09:30:00Z"), "{text}");

        doc.save().unwrap();
        let reloaded = ContentDocument::load(&path).unwrap();
        assert_eq!(reloaded.root, doc.root);

        let json = serde_json::to_string(&reloaded.root).unwrap();
        assert!(json.contains("\"date\":\"2024-05-01\""), "{json}");
    }

    #[test]
    fn test_toml_rejects_null_on_save() {
        let doc = ContentDocument {
            path: PathBuf::from("a.toml"),
            format: DocumentFormat::Toml,
            root: ContentNode::from(serde_json::json!({ "caption": null })),
        };
        assert!(matches!(
            doc.to_string_pretty(),
            Err(ContentError::Serialize { .. })
        ));
    }

    #[test]
    fn test_save_failure_is_a_write_error() {
        let doc = ContentDocument::parse(
            Path::new("/nonexistent/dir/page.json"),
            DocumentFormat::Json,
            "{}",
        )
        .unwrap();
        let err = doc.save().unwrap_err();
        assert!(matches!(err, ContentError::Write { .. }));
        assert!(err.to_string().starts_with("Failed to write"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = ContentDocument::parse(Path::new("broken.json"), DocumentFormat::Json, "{ nope")
            .unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.toml");
        std::fs::write(&path, "[hero]\nsrc = \"/img/a.png\"\n").unwrap();

        let doc = ContentDocument::load(&path).unwrap();
        doc.save().unwrap();
        let reloaded = ContentDocument::load(&path).unwrap();
        assert_eq!(reloaded.root, doc.root);
    }

    #[test]
    fn test_json_output_ends_with_newline() {
        let doc = ContentDocument::parse(Path::new("a.json"), DocumentFormat::Json, "[1, 2]")
            .unwrap();
        assert!(doc.to_string_pretty().unwrap().ends_with("]\n"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ContentDocument::load(Path::new("/nonexistent/page.json")).unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
    }
}
